use rust_decimal::Decimal;

use interface::{ExchangeError, OrderIntent, OrderType, Side, TimeInForce};

use super::{push_recv_window, BinanceClient};
use crate::params::{ParamLimit, ParamList};
use crate::request::{Endpoint, Method, Payload};

pub const ORDER_NEW: Endpoint = Endpoint::signed(Method::Post, "/api/v3/order");
pub const ORDER_QUERY: Endpoint = Endpoint::signed(Method::Get, "/api/v3/order");
pub const ORDER_CANCEL: Endpoint = Endpoint::signed(Method::Delete, "/api/v3/order");
pub const OPEN_ORDERS: Endpoint = Endpoint::signed(Method::Get, "/api/v3/openOrders");
pub const OPEN_ORDERS_CANCEL: Endpoint = Endpoint::signed(Method::Delete, "/api/v3/openOrders");
pub const ALL_ORDERS: Endpoint = Endpoint::signed(Method::Get, "/api/v3/allOrders");
pub const OCO_NEW: Endpoint = Endpoint::signed(Method::Post, "/api/v3/order/oco");
pub const OCO_CANCEL: Endpoint = Endpoint::signed(Method::Delete, "/api/v3/orderList");

pub const ALL_ORDERS_LIMIT: ParamLimit = ParamLimit::new(Some(500), 1000);

/// `POST /api/v3/order` 파라미터.
///
/// 주문 타입별 필수값 (거래소가 검증한다):
/// - LIMIT: timeInForce, quantity, price
/// - MARKET: quantity 또는 quoteOrderQty
/// - STOP_LOSS / TAKE_PROFIT: quantity, stopPrice
/// - STOP_LOSS_LIMIT / TAKE_PROFIT_LIMIT: timeInForce, quantity, price, stopPrice
/// - LIMIT_MAKER: quantity, price
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Option<Decimal>,
    pub quote_order_qty: Option<Decimal>,
    pub price: Option<Decimal>,
    /// 열린 주문 사이에서 유일해야 한다. 중복 제출 방지는 이 값으로 호출자가 한다.
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<Decimal>,
    pub iceberg_qty: Option<Decimal>,
    /// ACK, RESULT, FULL
    pub new_order_resp_type: Option<String>,
    pub recv_window: Option<u64>,
}

impl NewOrder {
    pub fn new(symbol: &str, side: Side, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type,
            time_in_force: None,
            quantity: None,
            quote_order_qty: None,
            price: None,
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            new_order_resp_type: None,
            recv_window: None,
        }
    }

    pub fn from_intent(intent: &OrderIntent) -> Self {
        Self {
            time_in_force: intent.time_in_force,
            quantity: Some(intent.quantity),
            price: intent.price,
            new_client_order_id: intent.client_order_id.clone(),
            stop_price: intent.stop_price,
            ..Self::new(&intent.symbol, intent.side, intent.order_type)
        }
    }

    pub fn to_params(&self) -> ParamList {
        let mut params = ParamList::new();
        params
            .push("symbol", &self.symbol)
            .push("side", self.side.as_binance())
            .push("type", self.order_type.as_binance())
            .push_opt("timeInForce", self.time_in_force.map(|t| t.as_str()))
            .push_opt("quantity", self.quantity.map(|d| d.normalize()))
            .push_opt("quoteOrderQty", self.quote_order_qty.map(|d| d.normalize()))
            .push_opt("price", self.price.map(|d| d.normalize()))
            .push_opt("newClientOrderId", non_empty(&self.new_client_order_id))
            .push_opt("stopPrice", self.stop_price.map(|d| d.normalize()))
            .push_opt("icebergQty", self.iceberg_qty.map(|d| d.normalize()))
            .push_opt("newOrderRespType", non_empty(&self.new_order_resp_type));
        push_recv_window(&mut params, self.recv_window);
        params
    }
}

/// `POST /api/v3/order/oco` 파라미터.
/// SELL: 지정가 > 현재가 > 스탑가, BUY: 지정가 < 현재가 < 스탑가.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOco {
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    pub price: Decimal,
    pub stop_price: Decimal,
    pub list_client_order_id: Option<String>,
    pub limit_client_order_id: Option<String>,
    pub limit_iceberg_qty: Option<Decimal>,
    pub stop_client_order_id: Option<String>,
    /// 주면 stop_limit_time_in_force 도 필요
    pub stop_limit_price: Option<Decimal>,
    pub stop_iceberg_qty: Option<Decimal>,
    pub stop_limit_time_in_force: Option<TimeInForce>,
    pub new_order_resp_type: Option<String>,
    pub recv_window: Option<u64>,
}

impl NewOco {
    pub fn new(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        stop_price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            quantity,
            price,
            stop_price,
            list_client_order_id: None,
            limit_client_order_id: None,
            limit_iceberg_qty: None,
            stop_client_order_id: None,
            stop_limit_price: None,
            stop_iceberg_qty: None,
            stop_limit_time_in_force: None,
            new_order_resp_type: None,
            recv_window: None,
        }
    }

    pub fn to_params(&self) -> ParamList {
        let mut params = ParamList::new();
        params
            .push("symbol", &self.symbol)
            .push("side", self.side.as_binance())
            .push("quantity", self.quantity.normalize())
            .push("price", self.price.normalize())
            .push("stopPrice", self.stop_price.normalize())
            .push_opt("listClientOrderId", non_empty(&self.list_client_order_id))
            .push_opt("limitClientOrderId", non_empty(&self.limit_client_order_id))
            .push_opt("limitIcebergQty", self.limit_iceberg_qty.map(|d| d.normalize()))
            .push_opt("stopClientOrderId", non_empty(&self.stop_client_order_id))
            .push_opt("stopLimitPrice", self.stop_limit_price.map(|d| d.normalize()))
            .push_opt("stopIcebergQty", self.stop_iceberg_qty.map(|d| d.normalize()))
            .push_opt(
                "stopLimitTimeInForce",
                self.stop_limit_time_in_force.map(|t| t.as_str()),
            )
            .push_opt("newOrderRespType", non_empty(&self.new_order_resp_type));
        push_recv_window(&mut params, self.recv_window);
        params
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// orderId 또는 origClientOrderId 중 하나는 있어야 한다 (거래소가 검증).
fn order_ref_params(
    symbol: &str,
    order_id: Option<u64>,
    orig_client_order_id: Option<&str>,
) -> ParamList {
    let mut params = ParamList::new();
    params
        .push("symbol", symbol)
        .push_opt("orderId", order_id)
        .push_opt(
            "origClientOrderId",
            orig_client_order_id.filter(|v| !v.is_empty()),
        );
    params
}

impl BinanceClient {
    /// 신규 주문. 자동 재시도하지 않는다.
    pub async fn new_order(&self, order: &NewOrder) -> Result<Payload, ExchangeError> {
        self.send(&ORDER_NEW, order.to_params(), None).await
    }

    /// 주문 상태 조회
    pub async fn query_order(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        orig_client_order_id: Option<&str>,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = order_ref_params(symbol, order_id, orig_client_order_id);
        push_recv_window(&mut params, recv_window);
        self.send(&ORDER_QUERY, params, None).await
    }

    /// 주문 취소
    pub async fn cancel_order(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        orig_client_order_id: Option<&str>,
        new_client_order_id: Option<&str>,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = order_ref_params(symbol, order_id, orig_client_order_id);
        params.push_opt(
            "newClientOrderId",
            new_client_order_id.filter(|v| !v.is_empty()),
        );
        push_recv_window(&mut params, recv_window);
        self.send(&ORDER_CANCEL, params, None).await
    }

    /// 심볼의 모든 열린 주문 취소 (OCO 포함)
    pub async fn cancel_all_orders(
        &self,
        symbol: &str,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params.push("symbol", symbol);
        push_recv_window(&mut params, recv_window);
        self.send(&OPEN_ORDERS_CANCEL, params, None).await
    }

    /// 열린 주문 목록. 심볼이 없으면 전체 심볼.
    pub async fn open_orders(
        &self,
        symbol: Option<&str>,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params.push_opt("symbol", symbol.filter(|s| !s.is_empty()));
        push_recv_window(&mut params, recv_window);
        self.send(&OPEN_ORDERS, params, None).await
    }

    /// 전체 주문 이력 (활성, 취소, 체결). order_id 가 있으면 그 이후부터.
    pub async fn all_orders(
        &self,
        symbol: &str,
        order_id: Option<u64>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        limit: Option<u64>,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("orderId", order_id)
            .push_opt("startTime", start_time)
            .push_opt("endTime", end_time)
            .push_opt("limit", ALL_ORDERS_LIMIT.resolve(limit));
        push_recv_window(&mut params, recv_window);
        self.send(&ALL_ORDERS, params, None).await
    }

    /// 신규 OCO. 주문 한도에는 2건으로 계산된다.
    pub async fn new_oco(&self, oco: &NewOco) -> Result<Payload, ExchangeError> {
        self.send(&OCO_NEW, oco.to_params(), None).await
    }

    /// OCO 전체 취소. 한쪽 레그만 취소해도 전체가 취소된다.
    pub async fn cancel_oco(
        &self,
        symbol: &str,
        order_list_id: Option<u64>,
        list_client_order_id: Option<&str>,
        new_client_order_id: Option<&str>,
        recv_window: Option<u64>,
    ) -> Result<Payload, ExchangeError> {
        let mut params = ParamList::new();
        params
            .push("symbol", symbol)
            .push_opt("orderListId", order_list_id)
            .push_opt(
                "listClientOrderId",
                list_client_order_id.filter(|v| !v.is_empty()),
            )
            .push_opt(
                "newClientOrderId",
                new_client_order_id.filter(|v| !v.is_empty()),
            );
        push_recv_window(&mut params, recv_window);
        self.send(&OCO_CANCEL, params, None).await
    }
}
