use crate::application::router::PaymentRouter;
use crate::domain::clock::Clock;
use crate::domain::ports::TransactionStoreBox;
use crate::domain::transaction::{Amount, PaymentInstrument, Transaction, TransactionStatus};
use crate::error::{Result, RoutingError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InitiateRequest {
    pub order_id: String,
    pub amount: Amount,
    pub instrument: PaymentInstrument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitiateResponse {
    pub order_id: String,
    pub amount: Amount,
    pub selected_gateway: String,
    pub status: TransactionStatus,
    pub gateway_transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallbackRequest {
    pub order_id: String,
    pub status: CallbackStatus,
    pub gateway: String,
    pub reason: Option<String>,
}

/// Order-level flow around the router: duplicate checks, the transaction
/// record, and gateway callbacks.
pub struct TransactionService {
    router: PaymentRouter,
    transactions: TransactionStoreBox,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<HashSet<String>>,
}

/// Claim on an order id while its initiate call is routing; released on drop.
struct OrderReservation<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    order_id: String,
}

impl Drop for OrderReservation<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        in_flight.remove(&self.order_id);
    }
}

impl TransactionService {
    pub fn new(
        router: PaymentRouter,
        transactions: TransactionStoreBox,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            router,
            transactions,
            clock,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn router(&self) -> &PaymentRouter {
        &self.router
    }

    /// Routes a new order and stores it as pending.
    ///
    /// A failed gateway attempt still returns normally; only a reused order id,
    /// an invalid instrument or an empty eligible set are errors.
    pub async fn initiate(&self, request: InitiateRequest) -> Result<InitiateResponse> {
        if request.order_id.trim().is_empty() {
            return Err(RoutingError::ValidationError(
                "Order ID is required".to_string(),
            ));
        }
        request.instrument.validate()?;

        // Held until the record is stored.
        let _reservation = self.reserve(&request.order_id)?;
        if self.transactions.exists(&request.order_id).await? {
            return Err(RoutingError::DuplicateOrder(request.order_id));
        }

        let outcome = self
            .router
            .route(&request.order_id, request.amount, &request.instrument)
            .await?;

        let mut tx = Transaction::new(
            request.order_id,
            request.amount,
            request.instrument,
            outcome.gateway,
            self.clock.now(),
        );
        tx.gateway_transaction_id = outcome.external_id;
        self.transactions.store(tx.clone()).await?;

        info!(
            order_id = %tx.order_id,
            gateway = %tx.selected_gateway,
            amount = %tx.amount,
            "Transaction initiated"
        );

        Ok(InitiateResponse {
            order_id: tx.order_id,
            amount: tx.amount,
            selected_gateway: tx.selected_gateway,
            status: tx.status,
            gateway_transaction_id: tx.gateway_transaction_id,
            created_at: tx.created_at,
        })
    }

    /// Applies a gateway's asynchronous verdict to the stored transaction.
    ///
    /// Callbacks naming a gateway that is not configured are rejected before
    /// anything is stored or recorded.
    pub async fn handle_callback(&self, callback: CallbackRequest) -> Result<Transaction> {
        let known = self
            .router
            .selector()
            .gateways()
            .iter()
            .any(|g| g.name == callback.gateway);
        if !known {
            warn!(
                order_id = %callback.order_id,
                gateway = %callback.gateway,
                "Callback for unconfigured gateway"
            );
            return Err(RoutingError::ValidationError(format!(
                "Unknown gateway: {}",
                callback.gateway
            )));
        }

        let mut tx = self
            .transactions
            .get(&callback.order_id)
            .await?
            .ok_or_else(|| RoutingError::TransactionNotFound(callback.order_id.clone()))?;

        let success = callback.status == CallbackStatus::Success;
        tx.status = if success {
            TransactionStatus::Success
        } else {
            TransactionStatus::Failure
        };
        if !success && callback.reason.is_some() {
            tx.failure_reason = callback.reason.clone();
        }
        tx.updated_at = self.clock.now();
        self.transactions.store(tx.clone()).await?;

        self.router
            .apply_callback(
                &callback.order_id,
                success,
                &callback.gateway,
                callback.reason.as_deref(),
            )
            .await?;

        info!(
            order_id = %tx.order_id,
            status = ?tx.status,
            gateway = %callback.gateway,
            "Transaction callback processed"
        );
        Ok(tx)
    }

    pub async fn find(&self, order_id: &str) -> Result<Option<Transaction>> {
        self.transactions.get(order_id).await
    }

    fn reserve(&self, order_id: &str) -> Result<OrderReservation<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !in_flight.insert(order_id.to_string()) {
            return Err(RoutingError::DuplicateOrder(order_id.to_string()));
        }
        Ok(OrderReservation {
            in_flight: &self.in_flight,
            order_id: order_id.to_string(),
        })
    }
}
