use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Rolling success/failure counters for one gateway over one monitoring window.
///
/// This is a plain value: it knows how to count and how to flip its own health
/// flag, but every decision about *when* to flip lives in the
/// `HealthEvaluator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthWindow {
    /// The gateway this window belongs to.
    pub gateway_name: String,
    /// Outcomes recorded in this window (`success_count + failure_count`).
    pub total_count: u64,
    pub success_count: u64,
    pub failure_count: u64,
    /// `success_count * 100 / total_count`, or exactly 100.0 while empty.
    pub success_rate: f64,
    pub healthy: bool,
    /// Set only while `healthy` is false and a cooldown is running.
    pub disabled_until: Option<DateTime<Utc>>,
    /// When this counting window began.
    pub window_start: DateTime<Utc>,
}

impl HealthWindow {
    /// A fresh, fully healthy window with zero counts.
    pub fn new(gateway_name: impl Into<String>, window_start: DateTime<Utc>) -> Self {
        Self {
            gateway_name: gateway_name.into(),
            total_count: 0,
            success_count: 0,
            failure_count: 0,
            success_rate: 100.0,
            healthy: true,
            disabled_until: None,
            window_start,
        }
    }

    /// Counts one more outcome and recomputes the success rate.
    pub fn record(&mut self, success: bool) {
        self.total_count += 1;
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
        self.success_rate = if self.total_count > 0 {
            (self.success_count as f64 * 100.0) / self.total_count as f64
        } else {
            100.0
        };
    }

    pub fn mark_unhealthy(&mut self, disabled_until: DateTime<Utc>) {
        self.healthy = false;
        self.disabled_until = Some(disabled_until);
    }

    pub fn mark_healthy(&mut self) {
        self.healthy = true;
        self.disabled_until = None;
    }

    /// True when the window is disabled but its cooldown has strictly passed.
    pub fn cooldown_elapsed(&self, now: DateTime<Utc>) -> bool {
        !self.healthy && self.disabled_until.is_some_and(|until| now > until)
    }

    pub fn is_currently_healthy(&self, now: DateTime<Utc>) -> bool {
        self.healthy || self.cooldown_elapsed(now)
    }
}
