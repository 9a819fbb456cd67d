use std::sync::Arc;
use std::time::{Duration, Instant};

use sentix_pipeline::RefreshPipeline;
use tokio_util::sync::CancellationToken;

use crate::config::ScheduleConfig;
use crate::error::LoaderError;

/// The loader daemon. Refreshes the whole watchlist on a fixed interval
/// until cancelled.
pub struct Daemon {
    pipeline: Arc<RefreshPipeline>,
    schedule: ScheduleConfig,
    cancel: CancellationToken,
}

impl Daemon {
    pub fn new(pipeline: Arc<RefreshPipeline>, schedule: ScheduleConfig) -> Self {
        Self {
            pipeline,
            schedule,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a CancellationToken that can be used to trigger shutdown.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the daemon until cancelled. A refresh in progress is allowed to
    /// finish; cancellation is observed between cycles.
    pub async fn run(&self) -> Result<(), LoaderError> {
        if self.schedule.refresh_interval_seconds == 0 {
            return Err(LoaderError::Config(
                "refresh_interval_seconds must be greater than zero".to_string(),
            ));
        }
        tracing::info!(
            interval_seconds = self.schedule.refresh_interval_seconds,
            "sentix loader starting"
        );

        let mut join_set = tokio::task::JoinSet::new();
        {
            let pipeline = Arc::clone(&self.pipeline);
            let interval = Duration::from_secs(self.schedule.refresh_interval_seconds);
            let cancel = self.cancel.clone();
            join_set.spawn(async move {
                refresh_loop(pipeline, interval, cancel).await;
            });
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Refresh task panicked");
            }
        }

        tracing::info!("sentix loader stopped");
        Ok(())
    }
}

/// Periodic loop: refresh immediately, then once per interval.
pub async fn refresh_loop(
    pipeline: Arc<RefreshPipeline>,
    interval: Duration,
    cancel: CancellationToken,
) {
    if cancel.is_cancelled() {
        return;
    }
    log_cycle(run_cycle(&pipeline).await);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Refresh loop shutting down");
                break;
            }
            _ = tokio::time::sleep(interval) => {
                log_cycle(run_cycle(&pipeline).await);
            }
        }
    }
}

/// One watchlist refresh. Returns the number of summaries produced.
pub async fn run_cycle(pipeline: &RefreshPipeline) -> Result<usize, LoaderError> {
    let start = Instant::now();
    let summaries = pipeline.refresh_watchlist().await?;
    let scored: u32 = summaries.iter().map(|s| s.counts.total()).sum();
    tracing::info!(
        symbols = summaries.len(),
        scored_articles = scored,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Watchlist refresh complete"
    );
    Ok(summaries.len())
}

fn log_cycle(result: Result<usize, LoaderError>) {
    if let Err(e) = result {
        tracing::error!(error = %e, "Watchlist refresh failed");
    }
}
