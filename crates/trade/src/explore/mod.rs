use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use color_eyre::eyre;
use serde_json::Value;
use tracing::info;

use exchanges::btcturk::TickerFilter;
use exchanges::normalize::date_to_unix;
use exchanges::{tabular, BinanceClient, BtcTurkClient, Normalized, Payload, Table};
use interface::ExchangeId;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 조회 대상. `from` 이 있으면 캔들, 없으면 티커.
#[derive(Debug, Clone)]
pub struct ExploreQuery {
    pub venue: ExchangeId,
    pub symbol: Option<String>,
    /// YYYY-MM-DD (로컬 자정)
    pub from: Option<String>,
    /// Binance kline 간격
    pub interval: String,
    pub limit: Option<u64>,
}

/// `YYYY-MM-DD` -> 로컬 자정의 epoch 초
pub fn start_seconds(date: &str) -> eyre::Result<i64> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| eyre::eyre!("날짜 형식 오류 ({}): {}", date, e))?;
    let seconds = date_to_unix(day.year(), day.month(), day.day())
        .ok_or_else(|| eyre::eyre!("로컬 시각으로 변환할 수 없는 날짜: {}", date))?;
    Ok(seconds.parse()?)
}

pub async fn fetch(query: &ExploreQuery) -> eyre::Result<Payload> {
    let from = query.from.as_deref().map(start_seconds).transpose()?;
    let symbol = query.symbol.as_deref();
    let timeout = Some(REQUEST_TIMEOUT);

    let payload = match (query.venue, from) {
        (ExchangeId::BtcTurk, Some(from)) => {
            let pair =
                symbol.ok_or_else(|| eyre::eyre!("OHLC 조회에는 --symbol 이 필요합니다"))?;
            BtcTurkClient::new().ohlc(pair, Some(from), None, timeout).await?
        }
        (ExchangeId::BtcTurk, None) => {
            let filter = symbol.map(TickerFilter::Pair).unwrap_or(TickerFilter::All);
            BtcTurkClient::new().ticker(filter, timeout).await?
        }
        (ExchangeId::Binance, Some(from)) => {
            let symbol =
                symbol.ok_or_else(|| eyre::eyre!("kline 조회에는 --symbol 이 필요합니다"))?;
            BinanceClient::new()
                .klines(symbol, &query.interval, Some(from * 1000), None, query.limit, timeout)
                .await?
        }
        (ExchangeId::Binance, None) => BinanceClient::new().price_ticker(symbol, timeout).await?,
    };
    Ok(payload)
}

/// 표는 탭 구분, 표로 만들 수 없는 응답은 원문 그대로
pub fn render(normalized: &Normalized) -> String {
    match normalized {
        Normalized::Table(table) => render_table(table),
        Normalized::Raw(Payload::Json(value)) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        Normalized::Raw(Payload::Raw(text)) => text.clone(),
    }
}

fn render_table(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.len() + 1);
    lines.push(table.columns.join("\t"));
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(cell_text).collect();
        lines.push(cells.join("\t"));
    }
    lines.join("\n")
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub async fn run(query: &ExploreQuery) -> eyre::Result<()> {
    let normalized = tabular(fetch(query).await?, true);
    match &normalized {
        Normalized::Table(table) => info!(
            "=== {} {} (총 {}행) ===",
            query.venue,
            query.symbol.as_deref().unwrap_or("ALL"),
            table.len()
        ),
        Normalized::Raw(_) => info!("=== {} (표 형식 아님) ===", query.venue),
    }
    println!("{}", render(&normalized));
    Ok(())
}
