use std::time::Duration;

use interface::ExchangeError;

use super::BinanceClient;
use crate::params::{ParamLimit, ParamList};
use crate::request::{Auth, Endpoint, Method, Payload};

pub const DEPTH: Endpoint = Endpoint::public(Method::Get, "/api/v3/depth");
pub const TRADES: Endpoint = Endpoint::public(Method::Get, "/api/v3/trades");
pub const HISTORICAL_TRADES: Endpoint = Endpoint {
    method: Method::Get,
    path: "/api/v3/historicalTrades",
    auth: Auth::ApiKey,
};
pub const AGG_TRADES: Endpoint = Endpoint::public(Method::Get, "/api/v3/aggTrades");
pub const KLINES: Endpoint = Endpoint::public(Method::Get, "/api/v3/klines");
pub const AVG_PRICE: Endpoint = Endpoint::public(Method::Get, "/api/v3/avgPrice");
pub const TICKER_24H: Endpoint = Endpoint::public(Method::Get, "/api/v3/ticker/24hr");
pub const TICKER_PRICE: Endpoint = Endpoint::public(Method::Get, "/api/v3/ticker/price");
pub const BOOK_TICKER: Endpoint = Endpoint::public(Method::Get, "/api/v3/ticker/bookTicker");

/// 유효값: 5, 10, 20, 50, 100, 500, 1000, 5000
pub const DEPTH_LIMIT: ParamLimit = ParamLimit::new(Some(100), 5000);
pub const TRADES_LIMIT: ParamLimit = ParamLimit::new(Some(500), 1000);

impl BinanceClient {
    /// 오더북. `{"lastUpdateId", "bids": [[price, qty]], "asks": [...]}`
    pub async fn order_book(
        &self,
        symbol: &str,
        limit: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", DEPTH_LIMIT.resolve(limit));
        self.send(&DEPTH, params, timeout).await
    }

    /// 최근 체결
    pub async fn trades(
        &self,
        symbol: &str,
        limit: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", TRADES_LIMIT.resolve(limit));
        self.send(&TRADES, params, timeout).await
    }

    /// 과거 체결. `from_id` 가 없으면 가장 최근부터.
    pub async fn historical_trades(
        &self,
        symbol: &str,
        limit: Option<u64>,
        from_id: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", TRADES_LIMIT.resolve(limit))
            .push_opt("fromId", from_id);
        self.send(&HISTORICAL_TRADES, params, timeout).await
    }

    /// 압축 체결. startTime ~ endTime 은 1시간 이내여야 한다 (거래소가 검증).
    pub async fn aggregate_trades(
        &self,
        symbol: &str,
        from_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", TRADES_LIMIT.resolve(limit))
            .push_opt("fromId", from_id)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time);
        self.send(&AGG_TRADES, params, timeout).await
    }

    /// 캔들. interval 예: "1m", "1h", "1d"
    pub async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("limit", TRADES_LIMIT.resolve(limit))
            .push("interval", interval)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time);
        self.send(&KLINES, params, timeout).await
    }

    /// 최근 평균가 `{"mins": 5, "price": "9.35751834"}`
    pub async fn avg_price(
        &self,
        symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params.push("symbol", symbol);
        self.send(&AVG_PRICE, params, timeout).await
    }

    /// 24시간 통계. 심볼이 없으면 전체 심볼 배열.
    pub async fn ticker_24h(
        &self,
        symbol: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        self.send(&TICKER_24H, symbol_params(symbol), timeout).await
    }

    /// 최근 체결가 `{"symbol": "LTCBTC", "price": "4.00000200"}`
    pub async fn price_ticker(
        &self,
        symbol: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        self.send(&TICKER_PRICE, symbol_params(symbol), timeout).await
    }

    /// 최우선 호가 `{"symbol", "bidPrice", "bidQty", "askPrice", "askQty"}`
    pub async fn book_ticker(
        &self,
        symbol: Option<&str>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        self.send(&BOOK_TICKER, symbol_params(symbol), timeout).await
    }
}

fn symbol_params(symbol: Option<&str>) -> ParamList {
    let mut params = ParamList::new();
    params.push_opt("symbol", symbol.filter(|s| !s.is_empty()));
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_limit_defaults_and_clamps() {
        assert_eq!(DEPTH_LIMIT.resolve(None), Some(100));
        assert_eq!(DEPTH_LIMIT.resolve(Some(10_000)), Some(5000));
        assert_eq!(TRADES_LIMIT.resolve(Some(1001)), Some(1000));
    }

    #[test]
    fn empty_symbol_is_omitted() {
        assert!(symbol_params(None).is_empty());
        assert!(symbol_params(Some("")).is_empty());
        assert_eq!(symbol_params(Some("BNBBTC")).to_query(), "symbol=BNBBTC");
    }

    #[test]
    fn historical_trades_needs_api_key_header() {
        assert!(HISTORICAL_TRADES.requires_auth());
        let client = BinanceClient::new();
        let result = client.build_request_at(&HISTORICAL_TRADES, &ParamList::new(), 1);
        assert!(matches!(result, Err(ExchangeError::Credentials(_))));

        let client = BinanceClient::with_keys("key", "secret");
        let request = client
            .build_request_at(&HISTORICAL_TRADES, &ParamList::new(), 1)
            .unwrap();
        assert_eq!(request.header("X-MBX-APIKEY"), Some("key"));
        assert!(!request.url.contains("signature"));
    }
}
