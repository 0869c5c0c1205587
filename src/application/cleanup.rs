use crate::application::health::HealthEvaluator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error};

/// Background sweep that purges stale health windows on a fixed cadence.
///
/// Runs independently of request traffic; it only touches the store through
/// the evaluator's `purge_stale`.
pub struct CleanupTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    pub fn spawn(evaluator: Arc<HealthEvaluator>, every: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(every);

            // Prevent immediately ticking when spawned
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        match evaluator.purge_stale().await {
                            Ok(purged) => debug!(purged, "Health cleanup sweep finished"),
                            Err(e) => error!(error = %e, "Health cleanup sweep failed"),
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Stops the sweep and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!(error = %e, "Health cleanup task panicked");
        }
    }
}
