use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use interface::{BalanceSnapshot, ExchangeError, ExchangeId, MarketSnapshot, OrderAck, OrderIntent};

pub mod binance;
pub mod btcturk;
pub mod credentials;
mod fields;
pub mod normalize;
pub mod params;
pub mod request;
#[cfg(test)]
mod testing;

/// 트레이딩 루프가 쓰는 거래소 기능.
/// 심볼 표기는 거래소 원문 그대로 (Binance `DOGETRY`, BtcTurk `DOGE_TRY`).
#[async_trait]
pub trait TradingVenue: Send + Sync {
    fn id(&self) -> ExchangeId;

    /// 최근 체결가
    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError>;

    async fn fetch_balances(&self) -> Result<BalanceSnapshot, ExchangeError>;

    async fn place_order(&self, intent: &OrderIntent) -> Result<OrderAck, ExchangeError>;

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<OrderAck, ExchangeError>;

    /// 해당 심볼의 미체결 주문 전부 취소. 미체결 주문이 없어도 성공.
    async fn cancel_all(&self, symbol: &str) -> Result<Vec<OrderAck>, ExchangeError>;
}

/// 아비트라지 모니터가 쓰는 최우선 호가 조회
#[async_trait]
pub trait QuoteVenue: Send + Sync {
    fn id(&self) -> ExchangeId;

    async fn fetch_quote(
        &self,
        pair_symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<MarketSnapshot, ExchangeError>;
}

// Convenience re-exports
pub use binance::BinanceClient;
pub use btcturk::BtcTurkClient;
pub use credentials::Credentials;
pub use normalize::{tabular, Normalized, Table};
pub use params::{ParamLimit, ParamList};
pub use request::{Payload, SignedRequest};
