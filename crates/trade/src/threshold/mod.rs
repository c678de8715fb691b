//! 임계값 트레이딩 전략.
//!
//! 매 사이클마다 현재가와 잔고를 새로 조회하고, 가격이 구간 아래면 매수,
//! 위면 매도, 그 외에는 미체결 주문을 정리한다. 사이클 사이에 상태는 없다.

mod cycle;
mod decision;
mod params;

#[cfg(test)]
pub(crate) use cycle::mock;
pub use cycle::{run_cycle, CycleOutcome};
pub use decision::{decide, total_value, truncate_quantity, CycleState, Decision, QUANTITY_DP};
pub use params::ThresholdParams;
