use rust_decimal::Decimal;
use tracing::{debug, info};

use exchanges::TradingVenue;
use interface::{ExchangeError, OrderAck};

use super::decision::{decide, total_value, CycleState, Decision};
use super::ThresholdParams;

/// 한 사이클의 결과
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub price: Decimal,
    pub total_value: Decimal,
    pub decision: Decision,
    /// dry-run 이면 비어 있다
    pub acks: Vec<OrderAck>,
}

/// 가격/잔고 조회 -> 판단 -> 주문 또는 정리. 재시도하지 않는다.
pub async fn run_cycle(
    venue: &dyn TradingVenue,
    params: &ThresholdParams,
) -> Result<CycleOutcome, ExchangeError> {
    debug!("[{}] {} {}", venue.id(), params.symbol, CycleState::Evaluating);

    let price = venue.fetch_price(&params.symbol).await?;
    let balances = venue.fetch_balances().await?;
    let total = total_value(price, &balances, params);

    info!(
        "[{}] {} price={} {}={} {}={} total={} {}",
        venue.id(),
        params.symbol,
        price,
        params.base_asset,
        balances.free(&params.base_asset),
        params.quote_asset,
        balances.free(&params.quote_asset),
        total.round_dp(8),
        params.quote_asset,
    );

    let decision = decide(price, &balances, params);

    if params.dry_run {
        match decision.intent() {
            Some(intent) => info!(
                "[dry-run] {} {} {} @ {:?}",
                intent.side, intent.quantity, intent.symbol, intent.price
            ),
            None => info!("[dry-run] cancel all open orders for {}", params.symbol),
        }
        return Ok(CycleOutcome {
            price,
            total_value: total,
            decision,
            acks: Vec::new(),
        });
    }

    let acks = match &decision {
        Decision::Buy(intent) | Decision::Sell(intent) => {
            info!(
                "{}: {} {} {} @ {}",
                decision.state(),
                intent.side,
                intent.quantity,
                intent.symbol,
                price
            );
            vec![venue.place_order(intent).await?]
        }
        Decision::Flatten => {
            let acks = venue.cancel_all(&params.symbol).await?;
            info!(
                "{}: cancelled {} open orders for {}",
                decision.state(),
                acks.len(),
                params.symbol
            );
            acks
        }
    };

    debug!("[{}] {} {}", venue.id(), params.symbol, CycleState::Idle);

    Ok(CycleOutcome {
        price,
        total_value: total,
        decision,
        acks,
    })
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use exchanges::TradingVenue;
    use interface::{
        Balance, BalanceSnapshot, ExchangeError, ExchangeId, OrderAck, OrderIntent,
    };

    /// 가격 응답을 순서대로 돌려주는 가짜 거래소
    pub struct MockVenue {
        prices: Mutex<VecDeque<Result<Decimal, ExchangeError>>>,
        balances: BalanceSnapshot,
        pub placed: Mutex<Vec<OrderIntent>>,
        pub cancel_all_calls: Mutex<Vec<String>>,
    }

    impl MockVenue {
        pub fn new(quote: Decimal, base: Decimal) -> Self {
            let mut balances = BalanceSnapshot::new();
            balances.insert("TRY", Balance { free: quote, locked: Decimal::ZERO });
            balances.insert("DOGE", Balance { free: base, locked: Decimal::ZERO });
            Self {
                prices: Mutex::new(VecDeque::new()),
                balances,
                placed: Mutex::new(Vec::new()),
                cancel_all_calls: Mutex::new(Vec::new()),
            }
        }

        pub fn push_price(&self, price: Result<Decimal, ExchangeError>) -> &Self {
            self.prices.lock().unwrap().push_back(price);
            self
        }

        pub fn placed(&self) -> Vec<OrderIntent> {
            self.placed.lock().unwrap().clone()
        }

        pub fn cancel_all_count(&self) -> usize {
            self.cancel_all_calls.lock().unwrap().len()
        }

        fn ack(symbol: &str) -> OrderAck {
            OrderAck {
                exchange: ExchangeId::Binance,
                symbol: symbol.to_string(),
                order_id: Some("1".to_string()),
                client_order_id: None,
                status: Some("NEW".to_string()),
                raw: serde_json::Value::Null,
            }
        }
    }

    #[async_trait]
    impl TradingVenue for MockVenue {
        fn id(&self) -> ExchangeId {
            ExchangeId::Binance
        }

        async fn fetch_price(&self, _symbol: &str) -> Result<Decimal, ExchangeError> {
            self.prices
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ExchangeError::Other("no price queued".to_string())))
        }

        async fn fetch_balances(&self) -> Result<BalanceSnapshot, ExchangeError> {
            Ok(self.balances.clone())
        }

        async fn place_order(&self, intent: &OrderIntent) -> Result<OrderAck, ExchangeError> {
            self.placed.lock().unwrap().push(intent.clone());
            Ok(Self::ack(&intent.symbol))
        }

        async fn cancel_order(&self, symbol: &str, _order_id: &str) -> Result<OrderAck, ExchangeError> {
            Ok(Self::ack(symbol))
        }

        async fn cancel_all(&self, symbol: &str) -> Result<Vec<OrderAck>, ExchangeError> {
            self.cancel_all_calls.lock().unwrap().push(symbol.to_string());
            Ok(Vec::new())
        }
    }
}
