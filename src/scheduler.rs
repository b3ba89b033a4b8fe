use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::aggregator::{DisplayOutcome, FeedAggregator};

/// Work driven by an [`AutoUpdater`].
#[async_trait]
pub trait UpdateJob: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs once, as soon as the schedule starts.
    async fn run_initial(&self);

    /// Runs on every following period.
    async fn run_periodic(&self);
}

#[async_trait]
impl UpdateJob for FeedAggregator {
    fn name(&self) -> &'static str {
        "FeedRefresh"
    }

    async fn run_initial(&self) {
        log_outcome(self.display_articles().await);
    }

    async fn run_periodic(&self) {
        log_outcome(self.refresh().await);
    }
}

fn log_outcome(outcome: DisplayOutcome) {
    match outcome {
        DisplayOutcome::Cached(n) | DisplayOutcome::Fetched(n) => {
            tracing::debug!("Feed refresh rendered {} articles ({:?})", n, outcome)
        }
        DisplayOutcome::Busy => tracing::debug!("Feed refresh skipped, pass in progress"),
        other => tracing::warn!("Feed refresh degraded: {:?}", other),
    }
}

/// Runs a job immediately and then once per period.
///
/// Runs are awaited inside the timer loop, so they never overlap; ticks
/// missed while a run is in progress are skipped.
pub struct AutoUpdater {
    job: Arc<dyn UpdateJob>,
    period: Duration,
}

impl AutoUpdater {
    pub fn new(job: Arc<dyn UpdateJob>, period: Duration) -> Self {
        Self { job, period }
    }

    pub fn start(self) -> UpdateHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let Self { job, period } = self;

        let task = tokio::spawn(async move {
            let name = job.name();
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut first_run = true;

            tracing::info!("Job '{}' scheduled every {:?}", name, period);

            loop {
                tokio::select! {
                    // Fires on stop() and when the handle is dropped
                    _ = &mut shutdown_rx => break,
                    _ = timer.tick() => {
                        if first_run {
                            first_run = false;
                            job.run_initial().await;
                        } else {
                            job.run_periodic().await;
                        }
                    }
                }
            }

            tracing::info!("Job '{}' stopped", name);
        });

        UpdateHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Controls a running [`AutoUpdater`]. Dropping the handle also stops it.
pub struct UpdateHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl UpdateHandle {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the schedule, letting a run in progress finish first.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(e) = self.task.await {
            tracing::error!("Update task ended abnormally: {}", e);
        }
    }
}

impl FeedAggregator {
    /// Renders now, then invalidates the cache and renders again every
    /// `update_interval`.
    pub fn start_auto_update(self: Arc<Self>) -> UpdateHandle {
        let period = self.config().update_interval();
        AutoUpdater::new(self, period).start()
    }
}
