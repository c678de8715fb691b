use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use interface::{BalanceSnapshot, ExchangeError, ExchangeId, MarketSnapshot, OrderAck, OrderIntent};

use super::account::parse_balances;
use super::{get_timestamp, BinanceClient, NewOrder, UNKNOWN_ORDER_CODE};
use crate::fields::{decimal_field, string_field};
use crate::{QuoteVenue, TradingVenue};

#[async_trait]
impl TradingVenue for BinanceClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let ticker = self.price_ticker(Some(symbol), None).await?.into_json()?;
        decimal_field(&ticker, "price")
    }

    async fn fetch_balances(&self) -> Result<BalanceSnapshot, ExchangeError> {
        let account = self.account_info(None).await?.into_json()?;
        parse_balances(&account)
    }

    async fn place_order(&self, intent: &OrderIntent) -> Result<OrderAck, ExchangeError> {
        let order = NewOrder::from_intent(intent);
        let response = self.new_order(&order).await?.into_json()?;
        Ok(order_ack(&intent.symbol, response))
    }

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<OrderAck, ExchangeError> {
        // 숫자면 orderId, 아니면 클라이언트 주문 ID 로 취급
        let response = match order_id.parse::<u64>() {
            Ok(id) => self.cancel_order(symbol, Some(id), None, None, None).await?,
            Err(_) => {
                self.cancel_order(symbol, None, Some(order_id), None, None)
                    .await?
            }
        };
        Ok(order_ack(symbol, response.into_json()?))
    }

    async fn cancel_all(&self, symbol: &str) -> Result<Vec<OrderAck>, ExchangeError> {
        match self.cancel_all_orders(symbol, None).await {
            Ok(payload) => match payload.into_json()? {
                Value::Array(items) => Ok(items
                    .into_iter()
                    .map(|item| order_ack(symbol, item))
                    .collect()),
                other => Ok(vec![order_ack(symbol, other)]),
            },
            Err(e) if e.api_code() == Some(UNKNOWN_ORDER_CODE) => {
                debug!("binance cancel_all {}: no open orders", symbol);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl QuoteVenue for BinanceClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::Binance
    }

    async fn fetch_quote(
        &self,
        pair_symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<MarketSnapshot, ExchangeError> {
        let ticker = self
            .book_ticker(Some(pair_symbol), timeout)
            .await?
            .into_json()?;

        Ok(MarketSnapshot {
            exchange: ExchangeId::Binance,
            pair_symbol: pair_symbol.to_string(),
            bid: decimal_field(&ticker, "bidPrice")?,
            ask: decimal_field(&ticker, "askPrice")?,
            // bookTicker 에는 시각이 없다
            timestamp_ms: get_timestamp(),
        })
    }
}

fn order_ack(symbol: &str, raw: Value) -> OrderAck {
    OrderAck {
        exchange: ExchangeId::Binance,
        symbol: string_field(&raw, "symbol").unwrap_or_else(|| symbol.to_string()),
        order_id: string_field(&raw, "orderId").or_else(|| string_field(&raw, "orderListId")),
        client_order_id: string_field(&raw, "clientOrderId")
            .or_else(|| string_field(&raw, "origClientOrderId"))
            .or_else(|| string_field(&raw, "listClientOrderId")),
        status: string_field(&raw, "status").or_else(|| string_field(&raw, "listOrderStatus")),
        raw,
    }
}
