//! 요청 파라미터 목록과 수치 파라미터 clamp 규칙.
//!
//! 선택 파라미터는 값이 있을 때만 목록에 들어간다. 빠진 파라미터는 서명 대상
//! 문자열에도 나타나지 않는다.

use std::fmt::Display;

/// 거래소 문서에 명시된 수치 파라미터 한도 (`limit`, `recvWindow` 등)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamLimit {
    pub default: Option<u64>,
    pub max: u64,
}

impl ParamLimit {
    pub const fn new(default: Option<u64>, max: u64) -> Self {
        Self { default, max }
    }

    /// 최대값을 넘는 값은 조용히 최대값으로 줄인다. 그 외 값은 그대로 통과.
    pub fn clamp(&self, value: u64) -> u64 {
        clamp(value, self.max)
    }

    /// 값이 없으면 기본값을 쓰고, 결과를 clamp 한다.
    pub fn resolve(&self, value: Option<u64>) -> Option<u64> {
        value.or(self.default).map(|v| self.clamp(v))
    }
}

pub fn clamp(value: u64, max: u64) -> u64 {
    value.min(max)
}

/// 삽입 순서를 유지하는 `key=value` 목록
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    pairs: Vec<(&'static str, String)>,
}

impl ParamList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn push_opt<T: Display>(&mut self, key: &'static str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    /// 빈 문자열은 "보내지 않음"으로 취급한다.
    pub fn push_non_empty(&mut self, key: &'static str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.push(key, value);
        }
        self
    }

    /// 같은 키를 반복해서 넣는다 (`type=buy&type=sell`).
    pub fn push_each(&mut self, key: &'static str, values: &[&str]) -> &mut Self {
        for value in values.iter().filter(|v| !v.is_empty()) {
            self.push(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// URL 인코딩된 쿼리 문자열 (선행 `?` 없음)
    pub fn to_query(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_reduces_only_above_max() {
        let limit = ParamLimit::new(Some(100), 5000);
        assert_eq!(limit.clamp(7000), 5000);
        assert_eq!(limit.clamp(5000), 5000);
        assert_eq!(limit.clamp(20), 20);
        assert_eq!(limit.clamp(0), 0);
    }

    #[test]
    fn clamp_is_idempotent() {
        for value in [0, 1, 999, 1000, 1001, 60_000, 60_001, u64::MAX] {
            let once = clamp(value, 60_000);
            assert_eq!(clamp(once, 60_000), once);
        }
    }

    #[test]
    fn resolve_uses_default_then_clamps() {
        let limit = ParamLimit::new(Some(500), 1000);
        assert_eq!(limit.resolve(None), Some(500));
        assert_eq!(limit.resolve(Some(5000)), Some(1000));

        let no_default = ParamLimit::new(None, 50);
        assert_eq!(no_default.resolve(None), None);
        assert_eq!(no_default.resolve(Some(80)), Some(50));
    }

    #[test]
    fn optional_params_are_skipped() {
        let mut params = ParamList::new();
        params
            .push("symbol", "DOGETRY")
            .push_opt::<u64>("fromId", None)
            .push_non_empty("newClientOrderId", "")
            .push_opt("limit", Some(10));

        assert_eq!(params.to_query(), "symbol=DOGETRY&limit=10");
        assert!(!params.contains("fromId"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn query_preserves_insertion_order_and_encodes_values() {
        let mut params = ParamList::new();
        params
            .push("zeta", 1)
            .push("alpha", "a b")
            .push_each("type", &["buy", "", "sell"]);

        assert_eq!(params.to_query(), "zeta=1&alpha=a%20b&type=buy&type=sell");
    }
}
