use std::{path::PathBuf, time::Duration};

use color_eyre::eyre;
use structopt::StructOpt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use exchanges::{BinanceClient, BtcTurkClient};
use oracle::{run_monitor, MonitorParams, RecordLog};

#[derive(Debug, StructOpt)]
#[structopt(name = "oracle", about = "BtcTurk / Binance 호가 차이 기록기")]
struct Opts {
    /// BtcTurk 페어
    #[structopt(long, default_value = "USDC_USDT")]
    btcturk_pair: String,
    /// Binance 심볼
    #[structopt(long, default_value = "USDCUSDT")]
    binance_pair: String,
    /// 폴링 간격 (초)
    #[structopt(long, default_value = "2")]
    interval: u64,
    /// 요청 타임아웃 (초)
    #[structopt(long, default_value = "2")]
    timeout: u64,
    /// 기록 파일 (탭 구분)
    #[structopt(long, parse(from_os_str), default_value = "coin_data.tsv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let opts = Opts::from_args();
    let params = MonitorParams {
        btcturk_pair: opts.btcturk_pair,
        binance_pair: opts.binance_pair,
        timeout: Duration::from_secs(opts.timeout),
        interval: Duration::from_secs(opts.interval),
        output: opts.output,
    };

    // 공개 API만 사용
    let btcturk = BtcTurkClient::new();
    let binance = BinanceClient::new();
    let log = RecordLog::open(&params.output)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("종료 신호 수신");
            trigger.cancel();
        }
    });

    let rows = run_monitor(&btcturk, &binance, &params, log, cancel).await;
    info!("완료! {} rows -> {}", rows, params.output.display());

    Ok(())
}
