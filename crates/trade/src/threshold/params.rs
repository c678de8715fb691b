use std::time::Duration;

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct ThresholdParams {
    /// 주문 심볼 (예: "DOGETRY")
    pub symbol: String,
    /// 기초 자산 (예: "DOGE")
    pub base_asset: String,
    /// 호가 자산 (예: "TRY")
    pub quote_asset: String,
    /// 이 가격 미만이면 매수
    pub lower: Decimal,
    /// 이 가격 초과면 매도
    pub upper: Decimal,
    /// 매수하려면 호가 자산이 이보다 많아야 한다
    pub quote_reserve: Decimal,
    /// 매도하려면 기초 자산이 이보다 많아야 한다
    pub base_reserve: Decimal,
    /// 주문 수량에서 빼는 안전 마진 (기초 자산 단위)
    pub margin: Decimal,
    /// 사이클 간격
    pub interval: Duration,
    /// 테스트 모드: true면 실제 주문을 넣지 않고 로그만 출력
    pub dry_run: bool,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            symbol: "DOGETRY".to_string(),
            base_asset: "DOGE".to_string(),
            quote_asset: "TRY".to_string(),
            lower: Decimal::new(395, 3),
            upper: Decimal::new(400, 3),
            quote_reserve: Decimal::from(10),
            base_reserve: Decimal::from(100),
            margin: Decimal::from(5),
            interval: Duration::from_secs(20),
            dry_run: false,
        }
    }
}

impl ThresholdParams {
    /// lower <= upper, margin >= 0
    pub fn validate(&self) -> Result<(), String> {
        if self.lower > self.upper {
            return Err(format!(
                "lower threshold {} is above upper threshold {}",
                self.lower, self.upper
            ));
        }
        if self.margin.is_sign_negative() {
            return Err(format!("margin must not be negative: {}", self.margin));
        }
        Ok(())
    }
}
