use super::health::HealthWindow;
use super::transaction::{Amount, PaymentInstrument, Transaction};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait HealthWindowStore: Send + Sync {
    /// The most recent window for `gateway_name` starting at or after `since`.
    async fn current(&self, gateway_name: &str, since: DateTime<Utc>)
    -> Result<Option<HealthWindow>>;

    /// Upserts a window, keyed by gateway name and window start.
    async fn save(&self, window: HealthWindow) -> Result<()>;

    /// Deletes every window that started before `cutoff`, returning how many went.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize>;

    /// Every window, across all gateways, starting at or after `since`.
    async fn all_current_windows(&self, since: DateTime<Utc>) -> Result<Vec<HealthWindow>>;

    /// The current window, or a fresh unsaved one starting at `now`.
    async fn get_or_create_current(
        &self,
        gateway_name: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<HealthWindow> {
        Ok(self
            .current(gateway_name, since)
            .await?
            .unwrap_or_else(|| HealthWindow::new(gateway_name, now)))
    }
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn exists(&self, order_id: &str) -> Result<bool>;
    async fn store(&self, tx: Transaction) -> Result<()>;
    async fn get(&self, order_id: &str) -> Result<Option<Transaction>>;
}

/// What a gateway answered for one payment attempt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GatewayResponse {
    pub external_id: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}

/// The network call to an upstream payment processor.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn attempt_payment(
        &self,
        gateway_name: &str,
        order_id: &str,
        amount: Amount,
        instrument: &PaymentInstrument,
    ) -> std::result::Result<GatewayResponse, GatewayError>;
}

pub type HealthWindowStoreBox = Box<dyn HealthWindowStore>;
pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
