use crate::config::HealthConfig;
use crate::domain::clock::Clock;
use crate::domain::health::HealthWindow;
use crate::domain::ports::HealthWindowStoreBox;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Outcomes needed in a window before its success rate may disable a gateway.
pub const MIN_SAMPLE_SIZE: u64 = 5;

/// The only writer of gateway health transitions.
///
/// Every read-modify-write of a gateway's window runs under that gateway's own
/// async lock, so concurrent outcomes for one gateway never lose an increment
/// while different gateways proceed independently.
pub struct HealthEvaluator {
    store: HealthWindowStoreBox,
    config: HealthConfig,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl HealthEvaluator {
    pub fn new(store: HealthWindowStoreBox, config: HealthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Counts one outcome for `gateway_name` and applies the disable rule.
    ///
    /// Not idempotent: every call is one more transaction in the window.
    pub async fn record_outcome(&self, gateway_name: &str, success: bool) -> Result<HealthWindow> {
        let lock = self.gateway_lock(gateway_name);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut window = self.current_window_at(gateway_name, now).await?;

        if window.cooldown_elapsed(now) {
            window.mark_healthy();
            info!(gateway = %gateway_name, "Gateway is healthy again after disabled period");
        }

        window.record(success);
        self.evaluate(&mut window, now);
        self.store.save(window.clone()).await?;

        debug!(
            gateway = %gateway_name,
            success,
            success_rate = window.success_rate,
            "Recorded transaction result"
        );
        Ok(window)
    }

    /// Whether the gateway may currently be selected.
    ///
    /// This is the lazy re-enable path: a window whose cooldown has passed is
    /// flipped back to healthy and persisted here.
    pub async fn is_healthy(&self, gateway_name: &str) -> Result<bool> {
        let lock = self.gateway_lock(gateway_name);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let mut window = self.current_window_at(gateway_name, now).await?;

        if window.cooldown_elapsed(now) {
            window.mark_healthy();
            self.store.save(window).await?;
            info!(gateway = %gateway_name, "Gateway is healthy again after disabled period");
            return Ok(true);
        }

        Ok(window.healthy)
    }

    /// Read-only view of the gateway's current window (fresh if none exists).
    pub async fn current_window(&self, gateway_name: &str) -> Result<HealthWindow> {
        self.current_window_at(gateway_name, self.clock.now()).await
    }

    /// Average success rate per gateway over every window still in the monitoring span.
    pub async fn aggregate_success_rates(&self) -> Result<BTreeMap<String, f64>> {
        let since = self.clock.now() - self.config.monitoring_window();
        let windows = self.store.all_current_windows(since).await?;

        let mut sums: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for window in windows {
            let entry = sums.entry(window.gateway_name).or_insert((0.0, 0));
            entry.0 += window.success_rate;
            entry.1 += 1;
        }

        Ok(sums
            .into_iter()
            .map(|(name, (sum, count))| (name, sum / f64::from(count)))
            .collect())
    }

    /// Drops windows that started more than two monitoring spans ago.
    pub async fn purge_stale(&self) -> Result<usize> {
        let cutoff = self.clock.now() - self.config.monitoring_window() * 2;
        let purged = self.store.purge_older_than(cutoff).await?;
        if purged > 0 {
            debug!(purged, "Cleaned up old health metrics records");
        }
        self.prune_idle_locks();
        Ok(purged)
    }

    async fn current_window_at(&self, gateway_name: &str, now: DateTime<Utc>) -> Result<HealthWindow> {
        let since = now - self.config.monitoring_window();
        self.store
            .get_or_create_current(gateway_name, since, now)
            .await
    }

    // Fires on every qualifying outcome, so a gateway that stays below the
    // threshold keeps pushing its cooldown forward.
    fn evaluate(&self, window: &mut HealthWindow, now: DateTime<Utc>) {
        let threshold = self.config.success_rate_threshold;
        if window.success_rate < threshold && window.total_count >= MIN_SAMPLE_SIZE {
            let disabled_until = now + self.config.disable_duration();
            window.mark_unhealthy(disabled_until);
            warn!(
                gateway = %window.gateway_name,
                success_rate = window.success_rate,
                threshold,
                %disabled_until,
                "Gateway marked as unhealthy"
            );
        }
    }

    // Entries referenced only by the map are not held by any caller.
    fn prune_idle_locks(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    fn gateway_lock(&self, gateway_name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(gateway_name.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}
