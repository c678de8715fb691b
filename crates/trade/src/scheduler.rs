//! 고정 간격 루프. 사이클 하나가 실패해도 로그만 남기고 다음 사이클로 넘어간다.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub cycles: u64,
    pub failures: u64,
}

/// `interval` 만큼 기다린 뒤 `cycle` 을 실행하는 것을 취소될 때까지 반복한다.
///
/// 취소 토큰은 매 사이클 시작 전과 대기 중에 확인한다. 실행 중인 사이클은 끝까지 진행한다.
pub async fn run_loop<F, Fut, T, E>(
    interval: Duration,
    cancel: CancellationToken,
    mut cycle: F,
) -> LoopStats
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut stats = LoopStats::default();

    loop {
        if cancel.is_cancelled() {
            break;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let n = stats.cycles + 1;
        match cycle(n).await {
            Ok(_) => {}
            Err(e) => {
                stats.failures += 1;
                error!("cycle {} failed: {}", n, e);
            }
        }
        stats.cycles = n;
    }

    info!(
        "loop stopped after {} cycles ({} failed)",
        stats.cycles, stats.failures
    );
    stats
}
