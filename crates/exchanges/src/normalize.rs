//! 응답 JSON 을 표 형태로 펼친다.
//!
//! 표로 만들 수 없는 응답은 실패하지 않고 `Normalized::Raw` 로 그대로 돌려준다.

use chrono::{Datelike, Local, NaiveDate, TimeZone, Timelike};
use serde_json::Value;

use crate::request::Payload;

/// 시각으로 변환하는 컬럼 (epoch millis)
pub const TIME_FIELDS: [&str; 4] = ["timestamp", "date", "time", "updateTime"];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Table(Table),
    Raw(Payload),
}

/// `{"data": ...}` 봉투가 있으면 벗기고 표로 만든다.
///
/// - 객체 하나는 한 행, 객체 배열은 여러 행. 컬럼은 처음 등장한 순서대로의 합집합.
/// - 배열의 배열(Binance klines 등)은 `0`, `1`, ... 인덱스 컬럼.
/// - `convert_time` 이면 [`TIME_FIELDS`] 컬럼을 로컬 시각 문자열로 바꾼다.
pub fn tabular(payload: Payload, convert_time: bool) -> Normalized {
    let value = match &payload {
        Payload::Json(value) => value,
        Payload::Raw(_) => return Normalized::Raw(payload),
    };

    let data = match value.get("data") {
        Some(inner) if value.is_object() => inner,
        _ => value,
    };

    let mut table = match to_table(data) {
        Some(table) => table,
        None => return Normalized::Raw(payload),
    };

    if convert_time {
        convert_time_columns(&mut table);
    }
    Normalized::Table(table)
}

fn to_table(data: &Value) -> Option<Table> {
    match data {
        Value::Object(_) => from_objects(std::slice::from_ref(data)),
        Value::Array(items) if items.iter().all(Value::is_object) => from_objects(items),
        Value::Array(items) if items.iter().all(Value::is_array) => Some(from_arrays(items)),
        _ => None,
    }
}

fn from_objects(items: &[Value]) -> Option<Table> {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        for key in item.as_object()?.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|c| item.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Some(Table { columns, rows })
}

fn from_arrays(items: &[Value]) -> Table {
    let width = items
        .iter()
        .filter_map(|item| item.as_array().map(Vec::len))
        .max()
        .unwrap_or(0);

    let rows = items
        .iter()
        .map(|item| {
            let cells = item.as_array().map(Vec::as_slice).unwrap_or(&[]);
            (0..width)
                .map(|i| cells.get(i).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Table {
        columns: (0..width).map(|i| i.to_string()).collect(),
        rows,
    }
}

fn convert_time_columns(table: &mut Table) {
    let indexes: Vec<usize> = TIME_FIELDS
        .iter()
        .filter_map(|field| table.column(field))
        .collect();

    for row in &mut table.rows {
        for &idx in &indexes {
            let converted = row.get(idx).and_then(epoch_millis).and_then(unix_to_date);
            if let Some(text) = converted {
                row[idx] = Value::String(text);
            }
        }
    }
}

fn epoch_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// epoch millis -> `D-M-YYYY H:M:S` (0 채움 없음, 로컬 시각)
pub fn unix_to_date(millis: i64) -> Option<String> {
    unix_to_date_in(millis, &Local)
}

pub fn unix_to_date_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<String> {
    // 초 미만은 버린다
    let t = tz.timestamp_opt(millis.div_euclid(1000), 0).single()?;
    Some(format!(
        "{}-{}-{} {}:{}:{}",
        t.day(),
        t.month(),
        t.year(),
        t.hour(),
        t.minute(),
        t.second()
    ))
}

/// 로컬 자정의 epoch 초 (문자열)
pub fn date_to_unix(year: i32, month: u32, day: u32) -> Option<String> {
    date_to_unix_in(year, month, day, &Local)
}

pub fn date_to_unix_in<Tz: TimeZone>(year: i32, month: u32, day: u32, tz: &Tz) -> Option<String> {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let local = tz.from_local_datetime(&midnight).earliest()?;
    Some(local.timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn converts_epoch_millis_without_padding() {
        assert_eq!(
            unix_to_date_in(1_499_865_549_590, &Utc).as_deref(),
            Some("12-7-2017 13:19:9")
        );
        assert_eq!(
            unix_to_date_in(0, &Utc).as_deref(),
            Some("1-1-1970 0:0:0")
        );
    }

    #[test]
    fn local_conversion_matches_local_offset() {
        let expected = unix_to_date_in(1_499_865_549_590, &Local);
        assert_eq!(unix_to_date(1_499_865_549_590), expected);
    }

    #[test]
    fn date_to_unix_is_midnight() {
        assert_eq!(
            date_to_unix_in(2017, 7, 12, &Utc).as_deref(),
            Some("1499817600")
        );
        assert_eq!(date_to_unix_in(2017, 2, 30, &Utc), None);
        assert!(date_to_unix(2017, 7, 12).is_some());
    }

    #[test]
    fn unwraps_data_envelope_into_rows() {
        let payload = Payload::Json(json!({
            "data": [
                {"pair": "BTCTRY", "last": 100.5},
                {"pair": "USDTTRY", "bid": 8.5, "last": 8.6}
            ],
            "success": true
        }));

        match tabular(payload, false) {
            Normalized::Table(table) => {
                assert_eq!(table.columns, vec!["pair", "last", "bid"]);
                assert_eq!(table.len(), 2);
                assert_eq!(table.cell(0, "bid"), Some(&Value::Null));
                assert_eq!(table.cell(1, "bid"), Some(&json!(8.5)));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn single_object_is_one_row_with_time_converted() {
        let payload = Payload::Json(json!({
            "symbol": "DOGETRY",
            "time": 1_499_865_549_590i64,
            "price": "0.394"
        }));

        match tabular(payload, true) {
            Normalized::Table(table) => {
                assert_eq!(table.len(), 1);
                assert_eq!(
                    table.cell(0, "time"),
                    Some(&Value::String(unix_to_date(1_499_865_549_590).unwrap()))
                );
                assert_eq!(table.cell(0, "price"), Some(&json!("0.394")));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn array_of_arrays_gets_index_columns() {
        let payload = Payload::Json(json!([
            [1499040000000i64, "0.01634790", "0.80000000"],
            [1499040060000i64, "0.01634800"]
        ]));

        match tabular(payload, true) {
            Normalized::Table(table) => {
                assert_eq!(table.columns, vec!["0", "1", "2"]);
                // 인덱스 컬럼은 시각 변환 대상이 아니다
                assert_eq!(table.cell(0, "0"), Some(&json!(1499040000000i64)));
                assert_eq!(table.cell(1, "2"), Some(&Value::Null));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn non_tabular_payloads_pass_through() {
        let raw = Payload::Raw("<html>".to_string());
        assert_eq!(tabular(raw.clone(), true), Normalized::Raw(raw));

        let scalar = Payload::Json(json!({"data": 5}));
        assert_eq!(tabular(scalar.clone(), true), Normalized::Raw(scalar));

        let mixed = Payload::Json(json!([{"a": 1}, 2]));
        assert_eq!(tabular(mixed.clone(), true), Normalized::Raw(mixed));
    }
}
