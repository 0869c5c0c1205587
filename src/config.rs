use crate::error::{Result, RoutingError};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// One upstream gateway as the operator configured it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayDescriptor {
    pub name: String,
    /// Relative selection probability.
    pub weight: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl GatewayDescriptor {
    pub fn new(name: impl Into<String>, weight: u32, enabled: bool) -> Self {
        Self {
            name: name.into(),
            weight,
            enabled,
        }
    }
}

/// Thresholds for the disable/re-enable state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Percentage (0-100) below which a gateway is disabled.
    pub success_rate_threshold: f64,
    pub monitoring_window_minutes: u32,
    pub disable_duration_minutes: u32,
    pub cleanup_interval_seconds: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            success_rate_threshold: 50.0,
            monitoring_window_minutes: 15,
            disable_duration_minutes: 5,
            cleanup_interval_seconds: 300,
        }
    }
}

impl HealthConfig {
    pub fn monitoring_window(&self) -> Duration {
        Duration::minutes(i64::from(self.monitoring_window_minutes))
    }

    pub fn disable_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.disable_duration_minutes))
    }

    pub fn cleanup_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cleanup_interval_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Behaviour of the simulated gateway used by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Per-gateway probability (0.0-1.0) that an attempt succeeds.
    pub success_rates: BTreeMap<String, f64>,
    pub default_success_rate: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            success_rates: BTreeMap::from([
                ("razorpay".to_string(), 0.95),
                ("payu".to_string(), 0.90),
                ("cashfree".to_string(), 0.92),
            ]),
            default_success_rate: 0.85,
            min_latency_ms: 0,
            max_latency_ms: 0,
        }
    }
}

impl SimulationConfig {
    pub fn success_rate_for(&self, gateway_name: &str) -> f64 {
        self.success_rates
            .get(&gateway_name.to_lowercase())
            .copied()
            .unwrap_or(self.default_success_rate)
    }
}

/// Everything the routing core needs, already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Ordered; the order is the roulette iteration order.
    pub gateways: Vec<GatewayDescriptor>,
    pub health: HealthConfig,
    /// Upper bound on a single gateway call; a timeout counts as a failure.
    pub attempt_timeout_ms: Option<u64>,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            gateways: vec![
                GatewayDescriptor::new("razorpay", 40, true),
                GatewayDescriptor::new("payu", 35, true),
                GatewayDescriptor::new("cashfree", 25, true),
            ],
            health: HealthConfig::default(),
            attempt_timeout_ms: None,
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl RoutingConfig {
    /// Reads and validates a TOML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: RoutingConfig = toml::from_str(contents)
            .map_err(|e| RoutingError::ConfigError(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gateways.is_empty() {
            return Err(RoutingError::ConfigError(
                "At least one gateway must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for gateway in &self.gateways {
            if gateway.name.trim().is_empty() {
                return Err(RoutingError::ConfigError(
                    "Gateway name must not be blank".to_string(),
                ));
            }
            if !seen.insert(gateway.name.as_str()) {
                return Err(RoutingError::ConfigError(format!(
                    "Duplicate gateway name: {}",
                    gateway.name
                )));
            }
        }

        let health = &self.health;
        if !(0.0..=100.0).contains(&health.success_rate_threshold) {
            return Err(RoutingError::ConfigError(format!(
                "success_rate_threshold must be within 0-100, got {}",
                health.success_rate_threshold
            )));
        }
        if health.monitoring_window_minutes == 0 {
            return Err(RoutingError::ConfigError(
                "monitoring_window_minutes must be greater than zero".to_string(),
            ));
        }
        if health.disable_duration_minutes == 0 {
            return Err(RoutingError::ConfigError(
                "disable_duration_minutes must be greater than zero".to_string(),
            ));
        }
        if health.cleanup_interval_seconds == 0 {
            return Err(RoutingError::ConfigError(
                "cleanup_interval_seconds must be greater than zero".to_string(),
            ));
        }

        let simulation = &self.simulation;
        let rates = simulation
            .success_rates
            .iter()
            .map(|(name, rate)| (name.as_str(), *rate))
            .chain(std::iter::once(("default", simulation.default_success_rate)));
        for (name, rate) in rates {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RoutingError::ConfigError(format!(
                    "Simulated success rate for {} must be within 0-1, got {}",
                    name, rate
                )));
            }
        }
        if simulation.min_latency_ms > simulation.max_latency_ms {
            return Err(RoutingError::ConfigError(
                "min_latency_ms must not exceed max_latency_ms".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}
