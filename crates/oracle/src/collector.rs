use std::{path::PathBuf, time::Duration};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use exchanges::normalize::unix_to_date;
use exchanges::QuoteVenue;
use interface::ExchangeError;

use crate::record::{ArbRecord, RecordLog};

#[derive(Debug, Clone)]
pub struct MonitorParams {
    /// BtcTurk 페어 (예: "USDC_USDT")
    pub btcturk_pair: String,
    /// Binance 심볼 (예: "USDCUSDT")
    pub binance_pair: String,
    /// 거래소별 요청 타임아웃
    pub timeout: Duration,
    /// 폴링 간격
    pub interval: Duration,
    pub output: PathBuf,
}

impl Default for MonitorParams {
    fn default() -> Self {
        Self {
            btcturk_pair: "USDC_USDT".to_string(),
            binance_pair: "USDCUSDT".to_string(),
            timeout: Duration::from_secs(2),
            interval: Duration::from_secs(2),
            output: PathBuf::from("coin_data.tsv"),
        }
    }
}

/// 두 거래소 호가를 동시에 조회한다. 둘 다 성공해야 기록을 만든다.
pub async fn poll_once(
    btcturk: &dyn QuoteVenue,
    binance: &dyn QuoteVenue,
    params: &MonitorParams,
) -> Result<ArbRecord, ExchangeError> {
    let timeout = Some(params.timeout);
    let (btcturk_quote, binance_quote) = tokio::join!(
        btcturk.fetch_quote(&params.btcturk_pair, timeout),
        binance.fetch_quote(&params.binance_pair, timeout),
    );
    let btcturk_quote = btcturk_quote?;
    let binance_quote = binance_quote?;

    let time = unix_to_date(btcturk_quote.timestamp_ms)
        .unwrap_or_else(|| btcturk_quote.timestamp_ms.to_string());

    Ok(ArbRecord {
        btcturk_bid: btcturk_quote.bid,
        btcturk_ask: btcturk_quote.ask,
        binance_bid: binance_quote.bid,
        binance_ask: binance_quote.ask,
        time,
    })
}

/// 취소될 때까지 폴링하고 기록한다. 실패한 사이클은 건너뛴다.
/// 이번 실행에서 기록한 행 수를 돌려준다.
pub async fn run_monitor(
    btcturk: &dyn QuoteVenue,
    binance: &dyn QuoteVenue,
    params: &MonitorParams,
    mut log: RecordLog,
    cancel: CancellationToken,
) -> u64 {
    info!(
        "모니터 시작: {} ({}) / {} ({}), {:?} 간격 -> {}",
        params.btcturk_pair,
        btcturk.id(),
        params.binance_pair,
        binance.id(),
        params.interval,
        log.path().display()
    );

    while !cancel.is_cancelled() {
        match poll_once(btcturk, binance, params).await {
            Ok(record) => match log.append(&record) {
                Ok(count) => info!("{} {}", count, record.to_line()),
                Err(e) => error!("record write failed: {}", e),
            },
            Err(e) if e.is_timeout() => {
                warn!("poll timed out after {:?}, skipping", params.timeout)
            }
            Err(e) => warn!("poll failed, skipping: {}", e),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(params.interval) => {}
        }
    }

    info!("모니터 종료: {} rows", log.written());
    log.written()
}
