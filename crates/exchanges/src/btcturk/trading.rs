use interface::{ExchangeError, OrderIntent, OrderType, Side};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::BtcTurkClient;
use crate::fields::decimal_to_json;
use crate::params::{ParamLimit, ParamList};
use crate::request::{Endpoint, Method, Payload};

pub const ALL_ORDERS: Endpoint = Endpoint::signed(Method::Get, "/api/v1/allOrders");
pub const OPEN_ORDERS: Endpoint = Endpoint::signed(Method::Get, "/api/v1/openOrders");
pub const ORDER_SUBMIT: Endpoint = Endpoint::signed(Method::Post, "/api/v1/order");
pub const ORDER_CANCEL: Endpoint = Endpoint::signed(Method::Delete, "/api/v1/order");

pub const ALL_ORDERS_LIMIT: ParamLimit = ParamLimit::new(None, 1000);

/// 주문 본문. JSON 으로 보내며, 가격/수량은 JSON 숫자.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOrder {
    pub pair_symbol: String,
    pub order_type: Side,
    pub order_method: &'static str,
    pub quantity: Decimal,
    /// 시장가 주문에서는 거래소가 무시한다
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub new_order_client_id: Option<String>,
}

impl SubmitOrder {
    pub fn new(
        pair_symbol: &str,
        side: Side,
        method: OrderType,
        quantity: Decimal,
    ) -> Result<Self, ExchangeError> {
        let order_method = method.as_btcturk().ok_or_else(|| {
            ExchangeError::Other(format!("BtcTurk does not support {:?} orders", method))
        })?;
        Ok(Self {
            pair_symbol: pair_symbol.to_string(),
            order_type: side,
            order_method,
            quantity,
            price: None,
            stop_price: None,
            new_order_client_id: None,
        })
    }

    pub fn from_intent(intent: &OrderIntent) -> Result<Self, ExchangeError> {
        let mut order = Self::new(&intent.symbol, intent.side, intent.order_type, intent.quantity)?;
        order.price = intent.price;
        order.stop_price = intent.stop_price;
        order.new_order_client_id = intent.client_order_id.clone();
        Ok(order)
    }

    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert("quantity".into(), decimal_to_json(self.quantity));
        if let Some(price) = self.price {
            body.insert("price".into(), decimal_to_json(price));
        }
        if let Some(stop_price) = self.stop_price {
            body.insert("stopPrice".into(), decimal_to_json(stop_price));
        }
        if let Some(id) = self.new_order_client_id.as_ref().filter(|id| !id.is_empty()) {
            body.insert("newOrderClientId".into(), Value::String(id.clone()));
        }
        body.insert("orderMethod".into(), Value::String(self.order_method.into()));
        body.insert(
            "orderType".into(),
            Value::String(self.order_type.as_btcturk().into()),
        );
        body.insert("pairSymbol".into(), Value::String(self.pair_symbol.clone()));
        Value::Object(body)
    }
}

impl BtcTurkClient {
    /// 전체 주문 내역. `order_id` 가 있으면 그 이상 ID 만.
    pub async fn all_orders(
        &self,
        pair_symbol: &str,
        order_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        page: Option<u32>,
        limit: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push_opt("orderId", order_id)
            .push("pairSymbol", pair_symbol)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("page", page)
            .push_opt("limit", ALL_ORDERS_LIMIT.resolve(limit));
        self.send(&ALL_ORDERS, params, None, None).await
    }

    /// 미체결 주문 `{"data": {"asks": [...], "bids": [...]}}`
    pub async fn open_orders(&self, pair_symbol: Option<&str>) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params.push_non_empty("pairSymbol", pair_symbol.unwrap_or_default());
        self.send(&OPEN_ORDERS, params, None, None).await
    }

    pub async fn submit_order(&self, order: &SubmitOrder) -> Result<Payload, ExchangeError> {
        self.send(&ORDER_SUBMIT, ParamList::new(), Some(order.to_json()), None)
            .await
    }

    pub async fn cancel_order(&self, id: &str) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params.push("id", id);
        self.send(&ORDER_CANCEL, params, None, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Body;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn limit_order_body() {
        let intent = OrderIntent::limit("DOGETRY", Side::Buy, dec!(248.16455696), dec!(0.394));
        let order = SubmitOrder::from_intent(&intent).unwrap();
        assert_eq!(
            order.to_json(),
            json!({
                "quantity": 248.16455696,
                "price": 0.394,
                "orderMethod": "limit",
                "orderType": "buy",
                "pairSymbol": "DOGETRY"
            })
        );
    }

    #[test]
    fn body_keeps_field_order() {
        let mut order = SubmitOrder::new("BTCTRY", Side::Sell, OrderType::StopLossLimit, dec!(1)).unwrap();
        order.price = Some(dec!(100));
        order.stop_price = Some(dec!(101));
        order.new_order_client_id = Some("client-1".to_string());

        let body = order.to_json().to_string();
        assert_eq!(
            body,
            r#"{"quantity":1,"price":100,"stopPrice":101,"newOrderClientId":"client-1","orderMethod":"stoplimit","orderType":"sell","pairSymbol":"BTCTRY"}"#
        );
    }

    #[test]
    fn unsupported_order_type_is_rejected() {
        let result = SubmitOrder::new("BTCTRY", Side::Buy, OrderType::TakeProfit, dec!(1));
        assert!(matches!(result, Err(ExchangeError::Other(_))));
    }

    #[test]
    fn submit_request_carries_json_body() {
        let client = BtcTurkClient::with_keys("key", "c2VjcmV0").unwrap();
        let order = SubmitOrder::new("DOGETRY", Side::Sell, OrderType::Market, dec!(20)).unwrap();
        let request = client
            .build_request_at(&ORDER_SUBMIT, &ParamList::new(), Some(order.to_json()), 1)
            .unwrap();

        assert_eq!(request.url, "https://api.btcturk.com/api/v1/order");
        match request.body {
            Body::Json(body) => {
                assert_eq!(body["orderMethod"], "market");
                assert!(body.get("price").is_none());
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn cancel_uses_query_id() {
        let client = BtcTurkClient::with_keys("key", "c2VjcmV0").unwrap();
        let mut params = ParamList::new();
        params.push("id", "42");
        let request = client.build_request_at(&ORDER_CANCEL, &params, None, 1).unwrap();
        assert_eq!(request.method, Method::Delete);
        assert!(request.url.ends_with("/api/v1/order?id=42"));
    }
}
