use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExchangeId {
    Binance,
    BtcTurk,
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExchangeId::Binance => "binance",
            ExchangeId::BtcTurk => "btcturk",
        };
        f.write_str(s)
    }
}

impl FromStr for ExchangeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binance" => Ok(ExchangeId::Binance),
            "btcturk" => Ok(ExchangeId::BtcTurk),
            other => Err(format!("unknown exchange: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Binance 표기 (`BUY`, `SELL`)
    pub fn as_binance(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// BtcTurk 표기 (`buy`, `sell`)
    pub fn as_btcturk(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_binance())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    StopLoss,
    StopLossLimit,
    TakeProfit,
    TakeProfitLimit,
    LimitMaker,
}

impl OrderType {
    pub fn as_binance(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
            OrderType::StopLoss => "STOP_LOSS",
            OrderType::StopLossLimit => "STOP_LOSS_LIMIT",
            OrderType::TakeProfit => "TAKE_PROFIT",
            OrderType::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            OrderType::LimitMaker => "LIMIT_MAKER",
        }
    }

    /// BtcTurk `orderMethod` 값. BtcTurk는 limit / market / stoplimit 만 지원한다.
    pub fn as_btcturk(&self) -> Option<&'static str> {
        match self {
            OrderType::Limit => Some("limit"),
            OrderType::Market => Some("market"),
            OrderType::StopLossLimit => Some("stoplimit"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    Gtc,
    Ioc,
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// 트레이딩 루프가 만드는 주문 의도.
/// 서명 전에 거래소별 파라미터 규칙(clamp)만 적용되고, 가격/수량 자체는 검증하지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: Option<TimeInForce>,
    pub client_order_id: Option<String>,
}

impl OrderIntent {
    /// GTC 지정가 주문
    pub fn limit(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            stop_price: None,
            time_in_force: Some(TimeInForce::Gtc),
            client_order_id: None,
        }
    }

    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: None,
            client_order_id: None,
        }
    }

    pub fn with_client_order_id(mut self, id: impl Into<String>) -> Self {
        self.client_order_id = Some(id.into());
        self
    }
}

/// 한 거래소의 최우선 매수/매도 호가
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub exchange: ExchangeId,
    pub pair_symbol: String,
    pub bid: Decimal,
    pub ask: Decimal,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub free: Decimal,
    pub locked: Decimal,
}

/// 자산 심볼 -> 잔고. 매 사이클마다 새로 조회하며 캐시하지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    balances: HashMap<String, Balance>,
}

impl BalanceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 자산 심볼은 대문자로 정규화해서 저장한다 (BtcTurk는 소문자를 돌려주기도 함)
    pub fn insert(&mut self, asset: &str, balance: Balance) {
        self.balances.insert(asset.to_uppercase(), balance);
    }

    pub fn get(&self, asset: &str) -> Option<&Balance> {
        self.balances.get(&asset.to_uppercase())
    }

    /// 거래 가능 수량. 목록에 없는 자산은 0.
    pub fn free(&self, asset: &str) -> Decimal {
        self.get(asset).map(|b| b.free).unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

/// 주문/취소 응답. 거래소 원본 응답은 `raw`에 그대로 보관한다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub exchange: ExchangeId,
    pub symbol: String,
    pub order_id: Option<String>,
    pub client_order_id: Option<String>,
    pub status: Option<String>,
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn balance_lookup_is_case_insensitive() {
        let mut snapshot = BalanceSnapshot::new();
        snapshot.insert(
            "try",
            Balance {
                free: dec!(100),
                locked: dec!(2.5),
            },
        );

        assert_eq!(snapshot.free("TRY"), dec!(100));
        assert_eq!(snapshot.get("Try").map(|b| b.locked), Some(dec!(2.5)));
        assert_eq!(snapshot.free("DOGE"), Decimal::ZERO);
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn limit_intent_defaults_to_gtc() {
        let intent = OrderIntent::limit("DOGETRY", Side::Buy, dec!(10), dec!(0.394))
            .with_client_order_id("abc-1");

        assert_eq!(intent.order_type, OrderType::Limit);
        assert_eq!(intent.time_in_force, Some(TimeInForce::Gtc));
        assert_eq!(intent.price, Some(dec!(0.394)));
        assert_eq!(intent.client_order_id.as_deref(), Some("abc-1"));
    }

    #[test]
    fn btcturk_supports_only_three_methods() {
        assert_eq!(OrderType::Limit.as_btcturk(), Some("limit"));
        assert_eq!(OrderType::Market.as_btcturk(), Some("market"));
        assert_eq!(OrderType::StopLossLimit.as_btcturk(), Some("stoplimit"));
        assert_eq!(OrderType::TakeProfit.as_btcturk(), None);
        assert_eq!(Side::Sell.as_btcturk(), "sell");
    }

    #[test]
    fn exchange_id_parses_cli_names() {
        assert_eq!("binance".parse::<ExchangeId>(), Ok(ExchangeId::Binance));
        assert_eq!("BtcTurk".parse::<ExchangeId>(), Ok(ExchangeId::BtcTurk));
        assert!("okx".parse::<ExchangeId>().is_err());
        assert_eq!(ExchangeId::BtcTurk.to_string(), "btcturk");
    }
}
