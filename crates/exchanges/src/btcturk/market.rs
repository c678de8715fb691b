use std::time::Duration;

use interface::ExchangeError;

use super::BtcTurkClient;
use crate::params::{ParamLimit, ParamList};
use crate::request::{Endpoint, Method, Payload};

pub const TICKER: Endpoint = Endpoint::public(Method::Get, "/api/v2/ticker");
pub const TICKER_CURRENCY: Endpoint = Endpoint::public(Method::Get, "/api/v2/ticker/currency");
pub const TRADES: Endpoint = Endpoint::public(Method::Get, "/api/v2/trades");
pub const ORDER_BOOK: Endpoint = Endpoint::public(Method::Get, "/api/v2/orderbook");
/// graph-api 호스트
pub const OHLC: Endpoint = Endpoint::public(Method::Get, "/v1/ohlcs");

pub const TRADES_LAST: ParamLimit = ParamLimit::new(None, 50);
pub const ORDER_BOOK_LIMIT: ParamLimit = ParamLimit::new(None, 1000);

/// 티커 조회 대상. 페어가 우선이고, 둘 다 없으면 전체.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerFilter<'a> {
    All,
    Pair(&'a str),
    Currency(&'a str),
}

impl<'a> TickerFilter<'a> {
    fn request(&self) -> (&'static Endpoint, ParamList) {
        let mut params = ParamList::new();
        match self {
            TickerFilter::All => (&TICKER, params),
            TickerFilter::Pair(pair) => {
                params.push_non_empty("pairSymbol", pair);
                (&TICKER, params)
            }
            TickerFilter::Currency(currency) => {
                params.push_non_empty("symbol", currency);
                (&TICKER_CURRENCY, params)
            }
        }
    }
}

impl BtcTurkClient {
    /// 티커 `{"data": [{pair, timestamp, last, high, low, bid, ask, ...}]}`
    pub async fn ticker(
        &self,
        filter: TickerFilter<'_>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let (endpoint, params) = filter.request();
        self.send(endpoint, params, None, timeout).await
    }

    /// 최근 체결. `last` 최대 50
    pub async fn trades(
        &self,
        pair_symbol: &str,
        last: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("pairSymbol", pair_symbol)
            .push_opt("last", TRADES_LAST.resolve(last));
        self.send(&TRADES, params, None, timeout).await
    }

    /// 오더북. 거래소 기본 100, 최대 1000
    pub async fn order_book(
        &self,
        pair_symbol: &str,
        limit: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("pairSymbol", pair_symbol)
            .push_opt("limit", ORDER_BOOK_LIMIT.resolve(limit));
        self.send(&ORDER_BOOK, params, None, timeout).await
    }

    /// OHLC 캔들. `from`/`to` 는 초 단위 unix time.
    pub async fn ohlc(
        &self,
        pair: &str,
        from: Option<i64>,
        to: Option<i64>,
        timeout: Option<Duration>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("pair", pair)
            .push_opt("from", from)
            .push_opt("to", to);
        self.send_graph(&OHLC, params, timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_filter_selects_endpoint() {
        let (endpoint, params) = TickerFilter::All.request();
        assert_eq!(endpoint.path, "/api/v2/ticker");
        assert!(params.is_empty());

        let (endpoint, params) = TickerFilter::Pair("USDT_TRY").request();
        assert_eq!(endpoint.path, "/api/v2/ticker");
        assert_eq!(params.to_query(), "pairSymbol=USDT_TRY");

        let (endpoint, params) = TickerFilter::Currency("USDT").request();
        assert_eq!(endpoint.path, "/api/v2/ticker/currency");
        assert_eq!(params.to_query(), "symbol=USDT");
    }

    #[test]
    fn empty_pair_falls_back_to_all_pairs() {
        let (endpoint, params) = TickerFilter::Pair("").request();
        assert_eq!(endpoint.path, "/api/v2/ticker");
        assert!(params.is_empty());
    }

    #[test]
    fn trades_last_is_clamped_and_omitted_when_absent() {
        assert_eq!(TRADES_LAST.resolve(Some(80)), Some(50));
        assert_eq!(TRADES_LAST.resolve(Some(10)), Some(10));
        assert_eq!(TRADES_LAST.resolve(None), None);
        assert_eq!(ORDER_BOOK_LIMIT.resolve(Some(5000)), Some(1000));
    }

    #[test]
    fn public_request_urls() {
        let client = BtcTurkClient::new();
        let mut params = ParamList::new();
        params
            .push("pairSymbol", "BTC_TRY")
            .push_opt("last", TRADES_LAST.resolve(Some(100)));
        let request = client.build_request_at(&TRADES, &params, None, 1).unwrap();
        assert_eq!(
            request.url,
            "https://api.btcturk.com/api/v2/trades?pairSymbol=BTC_TRY&last=50"
        );
    }
}
