use interface::{Balance, BalanceSnapshot, ExchangeError};
use serde_json::Value;

use super::BtcTurkClient;
use crate::fields::decimal_field;
use crate::params::ParamList;
use crate::request::{Endpoint, Method, Payload};

pub const BALANCES: Endpoint = Endpoint::signed(Method::Get, "/api/v1/users/balances");
pub const CRYPTO_TRANSACTIONS: Endpoint =
    Endpoint::signed(Method::Get, "/api/v1/users/transactions/crypto");
pub const FIAT_TRANSACTIONS: Endpoint =
    Endpoint::signed(Method::Get, "/api/v1/users/transactions/fiat");
pub const TRADE_TRANSACTIONS: Endpoint =
    Endpoint::signed(Method::Get, "/api/v1/users/transactions/trade");

impl BtcTurkClient {
    /// 잔고 `{"data": [{asset, assetname, balance, locked, free, ...}]}`
    pub async fn account_balance(&self) -> Result<Payload, ExchangeError> {
        self.send(&BALANCES, ParamList::new(), None, None).await
    }

    /// 암호화폐 입출금 내역. `types`: deposit / withdrawal, 기간이 없으면 최근 30일
    pub async fn crypto_transactions(
        &self,
        types: &[&str],
        symbols: &[&str],
        start_date: Option<i64>,
        end_date: Option<i64>,
    ) -> Result<Payload, ExchangeError> {
        let params = history_params("type", types, "symbol", symbols, start_date, end_date);
        self.send(&CRYPTO_TRANSACTIONS, params, None, None).await
    }

    /// 법정화폐 입출금 내역
    pub async fn fiat_transactions(
        &self,
        balance_types: &[&str],
        currency_symbols: &[&str],
        start_date: Option<i64>,
        end_date: Option<i64>,
    ) -> Result<Payload, ExchangeError> {
        let params = history_params(
            "balanceTypes",
            balance_types,
            "currencySymbols",
            currency_symbols,
            start_date,
            end_date,
        );
        self.send(&FIAT_TRANSACTIONS, params, None, None).await
    }

    /// 체결 내역. `types`: buy / sell
    pub async fn trade_transactions(
        &self,
        types: &[&str],
        symbols: &[&str],
        start_date: Option<i64>,
        end_date: Option<i64>,
    ) -> Result<Payload, ExchangeError> {
        let params = history_params("type", types, "symbol", symbols, start_date, end_date);
        self.send(&TRADE_TRANSACTIONS, params, None, None).await
    }
}

// 배열 파라미터는 키를 반복한다: type=buy&type=sell
fn history_params(
    kind_key: &'static str,
    kinds: &[&str],
    symbol_key: &'static str,
    symbols: &[&str],
    start_date: Option<i64>,
    end_date: Option<i64>,
) -> ParamList {
    let mut params = ParamList::new();
    params
        .push_each(kind_key, kinds)
        .push_each(symbol_key, symbols)
        .push_opt("startDate", start_date)
        .push_opt("endDate", end_date);
    params
}

/// `account_balance` 응답의 `data` 배열에서 잔고 추출
pub(crate) fn parse_balances(data: &Value) -> Result<BalanceSnapshot, ExchangeError> {
    let entries = data
        .as_array()
        .ok_or_else(|| ExchangeError::Malformed("balance data is not an array".to_string()))?;

    let mut snapshot = BalanceSnapshot::new();
    for entry in entries {
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
    fn array_params_repeat_key() {
        let params = history_params("type", &["buy", "sell"], "symbol", &["btc", "try"], None, Some(5));
        assert_eq!(
            params.to_query(),
            "type=buy&type=sell&symbol=btc&symbol=try&endDate=5"
        );
    }

    #[test]
    fn empty_filters_are_omitted() {
        let params = history_params("balanceTypes", &[], "currencySymbols", &[], None, None);
        assert!(params.is_empty());
    }

    #[test]
    fn fiat_path_has_query_separator() {
        let client = BtcTurkClient::with_keys("key", "c2VjcmV0").unwrap();
        let params = history_params(
            "balanceTypes",
            &["deposit"],
            "currencySymbols",
            &["try"],
            None,
            None,
        );
        let request = client
            .build_request_at(&FIAT_TRANSACTIONS, &params, None, 1)
            .unwrap();
        assert_eq!(
            request.url,
            "https://api.btcturk.com/api/v1/users/transactions/fiat?balanceTypes=deposit&currencySymbols=try"
        );
    }

    #[test]
    fn parses_balance_data() {
        let data = json!([
            {"asset": "TRY", "assetname": "Türk Lirası", "balance": "110.5", "locked": "10.5", "free": "100"},
            {"asset": "DOGE", "assetname": "Dogecoin", "balance": "0", "locked": "0", "free": "0"}
        ]);
        let snapshot = parse_balances(&data).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.free("try"), dec!(100));
        assert_eq!(snapshot.get("TRY").unwrap().locked, dec!(10.5));
    }

    #[test]
    fn balance_data_must_be_array() {
        assert!(matches!(
            parse_balances(&json!({"asset": "TRY"})),
            Err(ExchangeError::Malformed(_))
        ));
    }
}
