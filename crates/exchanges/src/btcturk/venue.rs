use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use interface::{BalanceSnapshot, ExchangeError, ExchangeId, MarketSnapshot, OrderAck, OrderIntent};

use super::account::parse_balances;
use super::{envelope_data, BtcTurkClient, SubmitOrder, TickerFilter};
use crate::fields::{decimal_field, i64_field, string_field};
use crate::{QuoteVenue, TradingVenue};

impl BtcTurkClient {
    /// 페어 티커 한 건. 응답은 배열이거나 단일 객체.
    async fn pair_ticker(
        &self,
        pair_symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<Value, ExchangeError> {
        let data = envelope_data(
            self.ticker(TickerFilter::Pair(pair_symbol), timeout)
                .await?
                .into_json()?,
        )?;
        first_entry(data)
            .ok_or_else(|| ExchangeError::Malformed(format!("no ticker for {}", pair_symbol)))
    }
}

#[async_trait]
impl TradingVenue for BtcTurkClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::BtcTurk
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal, ExchangeError> {
        let ticker = self.pair_ticker(symbol, None).await?;
        decimal_field(&ticker, "last")
    }

    async fn fetch_balances(&self) -> Result<BalanceSnapshot, ExchangeError> {
        let data = envelope_data(self.account_balance().await?.into_json()?)?;
        parse_balances(&data)
    }

    async fn place_order(&self, intent: &OrderIntent) -> Result<OrderAck, ExchangeError> {
        let order = SubmitOrder::from_intent(intent)?;
        let data = envelope_data(self.submit_order(&order).await?.into_json()?)?;
        Ok(order_ack(&intent.symbol, None, data))
    }

    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<OrderAck, ExchangeError> {
        let response = self.cancel_order(order_id).await?.into_json()?;
        Ok(order_ack(symbol, Some(order_id), response))
    }

    /// 일괄 취소 API 가 없어 미체결 주문을 조회한 뒤 하나씩 취소한다.
    async fn cancel_all(&self, symbol: &str) -> Result<Vec<OrderAck>, ExchangeError> {
        let data = envelope_data(self.open_orders(Some(symbol)).await?.into_json()?)?;
        let ids = open_order_ids(&data);
        if ids.is_empty() {
            debug!("btcturk cancel_all {}: no open orders", symbol);
            return Ok(Vec::new());
        }

        let mut acks = Vec::with_capacity(ids.len());
        for id in ids {
            let response = self.cancel_order(&id).await.map_err(|e| {
                warn!("btcturk cancel {} ({}) failed: {}", id, symbol, e);
                e
            })?;
            acks.push(order_ack(symbol, Some(&id), response.into_json()?));
        }
        Ok(acks)
    }
}

#[async_trait]
impl QuoteVenue for BtcTurkClient {
    fn id(&self) -> ExchangeId {
        ExchangeId::BtcTurk
    }

    async fn fetch_quote(
        &self,
        pair_symbol: &str,
        timeout: Option<Duration>,
    ) -> Result<MarketSnapshot, ExchangeError> {
        let ticker = self.pair_ticker(pair_symbol, timeout).await?;

        Ok(MarketSnapshot {
            exchange: ExchangeId::BtcTurk,
            pair_symbol: pair_symbol.to_string(),
            bid: decimal_field(&ticker, "bid")?,
            ask: decimal_field(&ticker, "ask")?,
            timestamp_ms: i64_field(&ticker, "timestamp")
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
        })
    }
}

fn first_entry(data: Value) -> Option<Value> {
    match data {
        Value::Array(items) => items.into_iter().next(),
        Value::Object(_) => Some(data),
        _ => None,
    }
}

/// `{"asks": [{id, ...}], "bids": [...]}` 의 주문 ID
fn open_order_ids(data: &Value) -> Vec<String> {
    ["asks", "bids"]
        .iter()
        .filter_map(|side| data.get(side).and_then(|orders| orders.as_array()))
        .flatten()
        .filter_map(|order| string_field(order, "id"))
        .collect()
}

fn order_ack(symbol: &str, order_id: Option<&str>, raw: Value) -> OrderAck {
    OrderAck {
        exchange: ExchangeId::BtcTurk,
        symbol: string_field(&raw, "pairSymbol").unwrap_or_else(|| symbol.to_string()),
        order_id: string_field(&raw, "id").or_else(|| order_id.map(str::to_string)),
        client_order_id: string_field(&raw, "newOrderClientId")
            .or_else(|| string_field(&raw, "orderClientId")),
        status: string_field(&raw, "status"),
        raw,
    }
}
