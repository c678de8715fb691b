use interface::{Balance, BalanceSnapshot, ExchangeError};
use serde_json::Value;

use super::{push_recv_window, BinanceClient};
use crate::fields::decimal_field;
use crate::params::ParamList;
use crate::request::{Endpoint, Method, Payload};

pub const ACCOUNT: Endpoint = Endpoint::signed(Method::Get, "/api/v3/account");

impl BinanceClient {
    /// 계정 정보 (수수료율, 권한, `balances: [{asset, free, locked}]`)
    pub async fn account_info(&self, recv_window: Option<u64>) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        push_recv_window(&mut params, recv_window);
        self.send(&ACCOUNT, params, None).await
    }
}

/// `account_info` 응답에서 잔고만 추출
pub(crate) fn parse_balances(account: &Value) -> Result<BalanceSnapshot, ExchangeError> {
    let balances = account
        .get("balances")
        .and_then(|b| b.as_array())
        .ok_or_else(|| ExchangeError::Malformed("account response without balances".to_string()))?;

    let mut snapshot = BalanceSnapshot::new();
    for entry in balances {
        let asset = match entry.get("asset").and_then(|a| a.as_str()) {
            Some(asset) => asset,
            None => continue,
        };
        snapshot.insert(
            asset,
            Balance {
                free: decimal_field(entry, "free")?,
                locked: decimal_field(entry, "locked")?,
            },
        );
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn parses_account_balances() {
        let account = json!({
            "makerCommission": 15,
            "canTrade": true,
            "balances": [
                {"asset": "TRY", "free": "100.00000000", "locked": "0.00000000"},
                {"asset": "DOGE", "free": "0.00000000", "locked": "12.50000000"}
            ]
        });

        let snapshot = parse_balances(&account).unwrap();
        assert_eq!(snapshot.free("TRY"), dec!(100));
        assert_eq!(snapshot.free("DOGE"), dec!(0));
        assert_eq!(snapshot.get("DOGE").unwrap().locked, dec!(12.5));
    }

    #[test]
    fn missing_balances_is_malformed() {
        let result = parse_balances(&json!({"code": -1022, "msg": "Signature invalid"}));
        assert!(matches!(result, Err(ExchangeError::Malformed(_))));
    }
}
