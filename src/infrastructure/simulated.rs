use crate::config::SimulationConfig;
use crate::domain::ports::{GatewayResponse, PaymentGateway};
use crate::domain::transaction::{Amount, PaymentInstrument};
use crate::error::GatewayError;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Stand-in for real upstream processors.
///
/// Each gateway succeeds with its configured probability after an optional
/// random latency, and hands back an id of the form `RAZORPAY_1a2b3c4d5e6f`.
pub struct SimulatedGateway {
    config: SimulationConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedGateway {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self {
            config,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn roll(&self, gateway_name: &str) -> (bool, Duration) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let success = rng.gen_bool(self.config.success_rate_for(gateway_name));
        let latency = rng.gen_range(self.config.min_latency_ms..=self.config.max_latency_ms);
        (success, Duration::from_millis(latency))
    }
}

fn external_id(gateway_name: &str) -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("{}_{}", gateway_name.to_uppercase(), &uuid[..12])
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn attempt_payment(
        &self,
        gateway_name: &str,
        order_id: &str,
        amount: Amount,
        _instrument: &PaymentInstrument,
    ) -> Result<GatewayResponse, GatewayError> {
        let (success, latency) = self.roll(gateway_name);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let external_id = external_id(gateway_name);
        info!(
            gateway = %gateway_name,
            order_id = %order_id,
            %amount,
            outcome = if success { "SUCCESS" } else { "FAILURE" },
            txn_id = %external_id,
            "Gateway response"
        );

        Ok(GatewayResponse {
            external_id: Some(external_id),
            success,
            error_message: (!success).then(|| "Simulated gateway failure".to_string()),
        })
    }
}
