use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use chrono::Local;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_DIR: &str = "logs";
pub const LOG_PREFIX: &str = "trading";

/// Tracing guards를 보관하는 구조체
/// 이 구조체가 drop되기 전까지 로깅이 계속 작동합니다
pub struct TracingGuards {
    _file: WorkerGuard,
    _stdout: WorkerGuard,
}

/// Tracing 초기화
/// 파일 로깅과 stdout 로깅을 모두 설정합니다
pub fn init_tracing(base_dir: &str, prefix: &str) -> io::Result<TracingGuards> {
    // 1) 파일 appender
    let (file_writer, file_guard) = daily_file_appender(base_dir, prefix)?;

    // 2) stdout도 non-blocking
    let (stdout_writer, stdout_guard) = non_blocking(io::stdout());

    // 3) RUST_LOG 가 없으면 info
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // 파일 로깅: INFO 레벨 이상만 기록
    let file_filter = EnvFilter::new("info");

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(file_filter),
        )
        .with(fmt::layer().with_writer(stdout_writer).with_ansi(true))
        .init();

    // guards를 리턴해서 main에서 들고 있게 만들기
    Ok(TracingGuards {
        _file: file_guard,
        _stdout: stdout_guard,
    })
}

/// `logs/trading.2025-11-29.log` 형식의 경로
pub fn dated_log_path(base_dir: &str, prefix: &str) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d").to_string();
    Path::new(base_dir).join(format!("{prefix}.{date}.log"))
}

/// 날짜별 로그 파일 생성 (append)
fn daily_file_appender(base_dir: &str, prefix: &str) -> io::Result<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(base_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dated_log_path(base_dir, prefix))?;

    Ok(non_blocking(file))
}
