use crate::application::health::HealthEvaluator;
use crate::application::selector::GatewaySelector;
use crate::domain::ports::{GatewayResponse, PaymentGatewayBox};
use crate::domain::transaction::{Amount, PaymentInstrument};
use crate::error::{GatewayError, Result, RoutingError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to one routed payment attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingOutcome {
    pub gateway: String,
    pub external_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// Select a gateway, call it, and feed the outcome back into health tracking.
pub struct PaymentRouter {
    selector: Arc<GatewaySelector>,
    evaluator: Arc<HealthEvaluator>,
    gateway: PaymentGatewayBox,
    attempt_timeout: Option<Duration>,
}

impl PaymentRouter {
    pub fn new(
        selector: Arc<GatewaySelector>,
        evaluator: Arc<HealthEvaluator>,
        gateway: PaymentGatewayBox,
    ) -> Self {
        Self {
            selector,
            evaluator,
            gateway,
            attempt_timeout: None,
        }
    }

    /// Bounds each gateway call; an expired call is recorded as a failure.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    pub fn selector(&self) -> &Arc<GatewaySelector> {
        &self.selector
    }

    /// Routes one payment.
    ///
    /// Gateway errors never escape: they become a failed outcome, which is
    /// recorded like any other. Only an empty eligible set fails the call.
    pub async fn route(
        &self,
        order_id: &str,
        amount: Amount,
        instrument: &PaymentInstrument,
    ) -> Result<RoutingOutcome> {
        let gateway = match self.selector.select_gateway().await {
            Ok(gateway) => gateway,
            Err(RoutingError::NoAvailableGateway) => {
                return Err(RoutingError::ServiceUnavailable(
                    "No healthy gateways available".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        info!(gateway = %gateway, order_id = %order_id, %amount, "Processing payment");

        let response = match self.attempt(&gateway, order_id, amount, instrument).await {
            Ok(response) => response,
            Err(e) => {
                error!(gateway = %gateway, order_id = %order_id, error = %e, "Gateway attempt failed");
                GatewayResponse {
                    external_id: None,
                    success: false,
                    error_message: Some(e.to_string()),
                }
            }
        };

        self.evaluator
            .record_outcome(&gateway, response.success)
            .await?;

        Ok(RoutingOutcome {
            gateway,
            external_id: response.external_id,
            success: response.success,
            error_message: response.error_message,
        })
    }

    /// Feeds an asynchronous gateway callback into the same health counters.
    pub async fn apply_callback(
        &self,
        order_id: &str,
        success: bool,
        gateway: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        self.evaluator.record_outcome(gateway, success).await?;

        if success {
            info!(order_id = %order_id, gateway = %gateway, "Callback recorded");
        } else {
            warn!(
                order_id = %order_id,
                gateway = %gateway,
                reason = reason.unwrap_or("unknown"),
                "Transaction failed"
            );
        }
        Ok(())
    }

    async fn attempt(
        &self,
        gateway: &str,
        order_id: &str,
        amount: Amount,
        instrument: &PaymentInstrument,
    ) -> std::result::Result<GatewayResponse, GatewayError> {
        let call = self
            .gateway
            .attempt_payment(gateway, order_id, amount, instrument);
        match self.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => call.await,
        }
    }
}
