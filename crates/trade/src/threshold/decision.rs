use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use interface::{BalanceSnapshot, OrderIntent, Side};

use super::ThresholdParams;

/// 주문 수량 소수 자리수
pub const QUANTITY_DP: u32 = 8;

/// 한 사이클의 진행 상태. 사이클 사이에 유지되는 상태는 없다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Evaluating,
    Buying,
    Selling,
    Flattening,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleState::Idle => "idle",
            CycleState::Evaluating => "evaluating",
            CycleState::Buying => "buying",
            CycleState::Selling => "selling",
            CycleState::Flattening => "flattening",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Buy(OrderIntent),
    Sell(OrderIntent),
    /// 해당 심볼의 미체결 주문 전부 취소
    Flatten,
}

impl Decision {
    pub fn state(&self) -> CycleState {
        match self {
            Decision::Buy(_) => CycleState::Buying,
            Decision::Sell(_) => CycleState::Selling,
            Decision::Flatten => CycleState::Flattening,
        }
    }

    pub fn intent(&self) -> Option<&OrderIntent> {
        match self {
            Decision::Buy(intent) | Decision::Sell(intent) => Some(intent),
            Decision::Flatten => None,
        }
    }
}

/// 가격과 잔고로 이번 사이클의 행동을 정한다.
///
/// - price < lower, 호가 자산 > quote_reserve: `quote / lower - margin` 만큼 현재가 매수
/// - price > upper, 기초 자산 > base_reserve: `base - margin` 만큼 현재가 매도
/// - 그 외, 또는 계산된 수량이 0 이하: 미체결 주문 정리
///
/// 경계값(price == lower, price == upper)은 주문하지 않는다.
pub fn decide(price: Decimal, balances: &BalanceSnapshot, params: &ThresholdParams) -> Decision {
    let quote_free = balances.free(&params.quote_asset);
    let base_free = balances.free(&params.base_asset);

    if price < params.lower && quote_free > params.quote_reserve && !params.lower.is_zero() {
        let quantity = truncate_quantity(quote_free / params.lower - params.margin);
        if quantity > Decimal::ZERO {
            return Decision::Buy(OrderIntent::limit(
                params.symbol.as_str(),
                Side::Buy,
                quantity,
                price,
            ));
        }
    } else if price > params.upper && base_free > params.base_reserve {
        let quantity = truncate_quantity(base_free - params.margin);
        if quantity > Decimal::ZERO {
            return Decision::Sell(OrderIntent::limit(
                params.symbol.as_str(),
                Side::Sell,
                quantity,
                price,
            ));
        }
    }

    Decision::Flatten
}

/// 0 방향으로 버림
pub fn truncate_quantity(quantity: Decimal) -> Decimal {
    quantity
        .round_dp_with_strategy(QUANTITY_DP, RoundingStrategy::ToZero)
        .normalize()
}

/// 로그용 총 평가액: base × price + quote
pub fn total_value(price: Decimal, balances: &BalanceSnapshot, params: &ThresholdParams) -> Decimal {
    balances.free(&params.base_asset) * price + balances.free(&params.quote_asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interface::{Balance, OrderType, TimeInForce};
    use rust_decimal_macros::dec;

    fn balances(quote: Decimal, base: Decimal) -> BalanceSnapshot {
        let mut snapshot = BalanceSnapshot::new();
        snapshot.insert(
            "TRY",
            Balance {
                free: quote,
                locked: Decimal::ZERO,
            },
        );
        snapshot.insert(
            "DOGE",
            Balance {
                free: base,
                locked: Decimal::ZERO,
            },
        );
        snapshot
    }

    #[test]
    fn buys_below_lower_threshold() {
        let params = ThresholdParams::default();
        let decision = decide(dec!(0.394), &balances(dec!(100), dec!(0)), &params);

        let intent = match decision {
            Decision::Buy(intent) => intent,
            other => panic!("expected buy, got {:?}", other),
        };
        assert_eq!(intent.symbol, "DOGETRY");
        assert_eq!(intent.side, Side::Buy);
        assert_eq!(intent.order_type, OrderType::Limit);
        assert_eq!(intent.time_in_force, Some(TimeInForce::Gtc));
        assert_eq!(intent.price, Some(dec!(0.394)));
        // 100 / 0.395 - 5 = 248.164556962...
        assert_eq!(intent.quantity, dec!(248.16455696));
    }

    #[test]
    fn price_equal_to_threshold_places_nothing() {
        let params = ThresholdParams::default();
        let rich = balances(dec!(1000), dec!(1000));

        assert_eq!(decide(dec!(0.395), &rich, &params), Decision::Flatten);
        assert_eq!(decide(dec!(0.400), &rich, &params), Decision::Flatten);
        assert_eq!(decide(dec!(0.398), &rich, &params), Decision::Flatten);
    }

    #[test]
    fn sells_above_upper_threshold() {
        let params = ThresholdParams::default();
        let decision = decide(dec!(0.41), &balances(dec!(0), dec!(150.5)), &params);

        let intent = decision.intent().cloned().expect("sell intent");
        assert_eq!(decision.state(), CycleState::Selling);
        assert_eq!(intent.side, Side::Sell);
        assert_eq!(intent.quantity, dec!(145.5));
        assert_eq!(intent.price, Some(dec!(0.41)));
    }

    #[test]
    fn above_upper_with_insufficient_base_flattens() {
        let params = ThresholdParams::default();
        let decision = decide(dec!(0.41), &balances(dec!(500), dec!(100)), &params);
        assert_eq!(decision, Decision::Flatten);
        assert_eq!(decision.state(), CycleState::Flattening);
    }

    #[test]
    fn below_lower_with_quote_at_reserve_flattens() {
        let params = ThresholdParams::default();
        assert_eq!(
            decide(dec!(0.30), &balances(dec!(10), dec!(0)), &params),
            Decision::Flatten
        );
    }

    #[test]
    fn non_positive_quantity_flattens() {
        let params = ThresholdParams {
            margin: dec!(50),
            ..Default::default()
        };
        // 11 / 0.395 - 50 < 0
        assert_eq!(
            decide(dec!(0.30), &balances(dec!(11), dec!(0)), &params),
            Decision::Flatten
        );
    }

    #[test]
    fn missing_assets_count_as_zero() {
        let params = ThresholdParams::default();
        assert_eq!(
            decide(dec!(0.30), &BalanceSnapshot::new(), &params),
            Decision::Flatten
        );
    }

    #[test]
    fn quantity_truncates_toward_zero() {
        assert_eq!(truncate_quantity(dec!(1.123456789)), dec!(1.12345678));
        assert_eq!(truncate_quantity(dec!(-1.123456789)), dec!(-1.12345678));
        assert_eq!(truncate_quantity(dec!(2.50000000)), dec!(2.5));
    }

    #[test]
    fn total_value_uses_free_balances() {
        let params = ThresholdParams::default();
        assert_eq!(
            total_value(dec!(0.4), &balances(dec!(10), dec!(100)), &params),
            dec!(50)
        );
    }
}
