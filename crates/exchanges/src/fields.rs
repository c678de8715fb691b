use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use interface::ExchangeError;

/// 숫자 또는 숫자 문자열을 Decimal 로 읽는다 (Binance는 문자열, BtcTurk 티커는 숫자).
pub(crate) fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        _ => None,
    }
}

pub(crate) fn decimal_field(obj: &Value, key: &str) -> Result<Decimal, ExchangeError> {
    obj.get(key)
        .and_then(as_decimal)
        .ok_or_else(|| ExchangeError::Malformed(format!("missing decimal field `{}`", key)))
}

pub(crate) fn string_field(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn i64_field(obj: &Value, key: &str) -> Option<i64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Decimal 을 JSON 숫자로 (BtcTurk 주문 본문)
pub(crate) fn decimal_to_json(value: Decimal) -> Value {
    serde_json::Number::from_str(&value.normalize().to_string())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn reads_decimal_from_string_and_number() {
        let obj = json!({"bidPrice": "0.99980000", "bid": 0.394, "n": null});
        assert_eq!(decimal_field(&obj, "bidPrice").unwrap(), dec!(0.9998));
        assert_eq!(decimal_field(&obj, "bid").unwrap(), dec!(0.394));
        assert!(decimal_field(&obj, "n").is_err());
        assert!(decimal_field(&obj, "missing").is_err());
    }

    #[test]
    fn string_and_int_fields_accept_both_encodings() {
        let obj = json!({"orderId": 28, "id": "42", "ts": "1499865549590"});
        assert_eq!(string_field(&obj, "orderId").as_deref(), Some("28"));
        assert_eq!(i64_field(&obj, "id"), Some(42));
        assert_eq!(i64_field(&obj, "ts"), Some(1_499_865_549_590));
    }

    #[test]
    fn decimal_to_json_is_numeric() {
        assert_eq!(decimal_to_json(dec!(248.16455696)), json!(248.16455696));
        assert_eq!(decimal_to_json(dec!(0.39400)), json!(0.394));
    }
}
