use std::time::Duration;

use color_eyre::eyre;
use rust_decimal::Decimal;
use structopt::StructOpt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use exchanges::{BinanceClient, BtcTurkClient, TradingVenue};
use interface::ExchangeId;
use trade::explore::{self, ExploreQuery};
use trade::logger::{init_tracing, LOG_DIR, LOG_PREFIX};
use trade::{run_cycle, run_loop, ThresholdParams};

// lib.rs에서 자동으로 dotenv가 로드됨

#[derive(Debug, StructOpt)]
#[structopt(name = "trade", about = "임계값 현물 거래 봇")]
enum Command {
    /// 중단(Ctrl-C)될 때까지 주기적으로 실행
    Run(TradeOpts),
    /// 한 사이클만 실행
    Once(TradeOpts),
    /// 공개 시세를 표로 출력 (--from 이 있으면 캔들)
    Explore(ExploreOpts),
}

#[derive(Debug, StructOpt)]
struct ExploreOpts {
    /// binance | btcturk
    #[structopt(long, default_value = "btcturk")]
    venue: ExchangeId,
    /// BtcTurk 페어(USDT_TRY) 또는 Binance 심볼(USDTTRY)
    #[structopt(long)]
    symbol: Option<String>,
    /// 시작일 YYYY-MM-DD
    #[structopt(long)]
    from: Option<String>,
    #[structopt(long, default_value = "1d")]
    interval: String,
    #[structopt(long)]
    limit: Option<u64>,
}

impl From<ExploreOpts> for ExploreQuery {
    fn from(opts: ExploreOpts) -> Self {
        ExploreQuery {
            venue: opts.venue,
            symbol: opts.symbol,
            from: opts.from,
            interval: opts.interval,
            limit: opts.limit,
        }
    }
}

#[derive(Debug, StructOpt)]
struct TradeOpts {
    /// binance | btcturk
    #[structopt(long, default_value = "binance")]
    venue: ExchangeId,
    #[structopt(long)]
    symbol: Option<String>,
    #[structopt(long)]
    base: Option<String>,
    #[structopt(long)]
    quote: Option<String>,
    /// 이 가격 미만이면 매수
    #[structopt(long)]
    lower: Option<Decimal>,
    /// 이 가격 초과면 매도
    #[structopt(long)]
    upper: Option<Decimal>,
    #[structopt(long)]
    quote_reserve: Option<Decimal>,
    #[structopt(long)]
    base_reserve: Option<Decimal>,
    /// 주문 수량 안전 마진
    #[structopt(long)]
    margin: Option<Decimal>,
    /// 사이클 간격 (초)
    #[structopt(long)]
    interval: Option<u64>,
    /// 주문을 넣지 않고 로그만 출력
    #[structopt(long)]
    dry_run: bool,
}

impl TradeOpts {
    fn params(&self) -> ThresholdParams {
        let defaults = ThresholdParams::default();
        ThresholdParams {
            symbol: self.symbol.clone().unwrap_or(defaults.symbol),
            base_asset: self.base.clone().unwrap_or(defaults.base_asset),
            quote_asset: self.quote.clone().unwrap_or(defaults.quote_asset),
            lower: self.lower.unwrap_or(defaults.lower),
            upper: self.upper.unwrap_or(defaults.upper),
            quote_reserve: self.quote_reserve.unwrap_or(defaults.quote_reserve),
            base_reserve: self.base_reserve.unwrap_or(defaults.base_reserve),
            margin: self.margin.unwrap_or(defaults.margin),
            interval: self
                .interval
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    // init logging (stdout + logs/trading.YYYY-MM-DD.log)
    let _guards = init_tracing(LOG_DIR, LOG_PREFIX)?;

    let cmd = Command::from_args();

    match cmd {
        Command::Run(opts) => run_bot(opts).await,
        Command::Once(opts) => run_once(opts).await,
        Command::Explore(opts) => explore::run(&opts.into()).await,
    }
}

/// 인증 정보가 없으면 시작하지 않는다
fn connect(venue: ExchangeId) -> eyre::Result<Box<dyn TradingVenue>> {
    let ready = match venue {
        ExchangeId::Binance => exchanges::binance::has_api_credentials(),
        ExchangeId::BtcTurk => exchanges::btcturk::has_api_credentials(),
    };
    if !ready {
        eyre::bail!("{} API 키가 설정되지 않았습니다 (.env 확인)", venue);
    }

    let venue: Box<dyn TradingVenue> = match venue {
        ExchangeId::Binance => Box::new(BinanceClient::with_credentials()?),
        ExchangeId::BtcTurk => Box::new(BtcTurkClient::with_credentials()?),
    };
    Ok(venue)
}

fn log_params(venue: ExchangeId, params: &ThresholdParams) {
    info!("파라미터:");
    info!("  Venue: {}", venue);
    info!("  Symbol: {} ({}/{})", params.symbol, params.base_asset, params.quote_asset);
    info!("  Lower / Upper: {} / {}", params.lower, params.upper);
    info!(
        "  Reserve: {} {}, {} {}",
        params.quote_reserve, params.quote_asset, params.base_reserve, params.base_asset
    );
    info!("  Margin: {}", params.margin);
    info!("  Interval: {:?}", params.interval);
    info!("  Dry Run: {}", params.dry_run);
}

async fn run_bot(opts: TradeOpts) -> eyre::Result<()> {
    let params = opts.params();
    params.validate().map_err(|e| eyre::eyre!(e))?;
    let venue = connect(opts.venue)?;

    info!("거래 봇 시작...");
    log_params(opts.venue, &params);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("종료 신호 수신, 현재 사이클 이후 중단합니다");
            trigger.cancel();
        }
    });

    let venue: &dyn TradingVenue = &*venue;
    let params_ref = &params;
    let stats = run_loop(params.interval, cancel, move |_| async move {
        run_cycle(venue, params_ref).await
    })
    .await;

    info!("완료! cycles={} failures={}", stats.cycles, stats.failures);
    Ok(())
}

async fn run_once(opts: TradeOpts) -> eyre::Result<()> {
    let params = opts.params();
    params.validate().map_err(|e| eyre::eyre!(e))?;
    let venue = connect(opts.venue)?;

    log_params(opts.venue, &params);

    let outcome = run_cycle(&*venue, &params).await?;
    info!(
        "{} price={} total={} acks={}",
        outcome.decision.state(),
        outcome.price,
        outcome.total_value,
        outcome.acks.len()
    );

    Ok(())
}
