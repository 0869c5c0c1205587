use crate::domain::health::HealthWindow;
use crate::domain::ports::{HealthWindowStore, TransactionStore};
use crate::domain::transaction::Transaction;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for gateway health windows.
///
/// Windows are grouped by gateway name; a gateway may hold several windows
/// until the cleanup sweep purges the stale ones.
#[derive(Default, Clone)]
pub struct InMemoryHealthStore {
    windows: Arc<RwLock<HashMap<String, Vec<HealthWindow>>>>,
}

impl InMemoryHealthStore {
    /// Creates a new, empty in-memory health store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthWindowStore for InMemoryHealthStore {
    async fn current(
        &self,
        gateway_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<HealthWindow>> {
        let windows = self.windows.read().await;
        Ok(windows.get(gateway_name).and_then(|list| {
            list.iter()
                .filter(|w| w.window_start >= since)
                .max_by_key(|w| w.window_start)
                .cloned()
        }))
    }

    async fn save(&self, window: HealthWindow) -> Result<()> {
        let mut windows = self.windows.write().await;
        let list = windows.entry(window.gateway_name.clone()).or_default();
        match list
            .iter_mut()
            .find(|w| w.window_start == window.window_start)
        {
            Some(existing) => *existing = window,
            None => list.push(window),
        }
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut windows = self.windows.write().await;
        let mut purged = 0;
        for list in windows.values_mut() {
            let before = list.len();
            list.retain(|w| w.window_start >= cutoff);
            purged += before - list.len();
        }
        windows.retain(|_, list| !list.is_empty());
        Ok(purged)
    }

    async fn all_current_windows(&self, since: DateTime<Utc>) -> Result<Vec<HealthWindow>> {
        let windows = self.windows.read().await;
        Ok(windows
            .values()
            .flatten()
            .filter(|w| w.window_start >= since)
            .cloned()
            .collect())
    }
}

/// A thread-safe in-memory store for transactions, keyed by order id.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn exists(&self, order_id: &str) -> Result<bool> {
        let transactions = self.transactions.read().await;
        Ok(transactions.contains_key(order_id))
    }

    async fn store(&self, tx: Transaction) -> Result<()> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.order_id.clone(), tx);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(order_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{Amount, PaymentInstrument};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_current_returns_latest_window_in_span() {
        let store = InMemoryHealthStore::new();
        let now = Utc::now();

        let old = HealthWindow::new("razorpay", now - Duration::minutes(30));
        let mut recent = HealthWindow::new("razorpay", now - Duration::minutes(2));
        recent.record(false);
        store.save(old).await.unwrap();
        store.save(recent.clone()).await.unwrap();

        let since = now - Duration::minutes(15);
        let current = store.current("razorpay", since).await.unwrap().unwrap();
        assert_eq!(current, recent);
        assert!(store.current("payu", since).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_upserts_same_window() {
        let store = InMemoryHealthStore::new();
        let mut window = HealthWindow::new("payu", Utc::now());
        store.save(window.clone()).await.unwrap();
        window.record(true);
        store.save(window.clone()).await.unwrap();

        let all = store
            .all_current_windows(window.window_start)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_count, 1);
    }

    #[tokio::test]
    async fn test_purge_older_than() {
        let store = InMemoryHealthStore::new();
        let now = Utc::now();
        store
            .save(HealthWindow::new("razorpay", now - Duration::minutes(40)))
            .await
            .unwrap();
        store
            .save(HealthWindow::new("razorpay", now - Duration::minutes(5)))
            .await
            .unwrap();
        store
            .save(HealthWindow::new("cashfree", now - Duration::minutes(45)))
            .await
            .unwrap();

        let purged = store
            .purge_older_than(now - Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(purged, 2);

        let remaining = store
            .all_current_windows(now - Duration::days(1))
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].gateway_name, "razorpay");
    }

    #[tokio::test]
    async fn test_get_or_create_does_not_persist() {
        let store = InMemoryHealthStore::new();
        let now = Utc::now();
        let window = store
            .get_or_create_current("razorpay", now - Duration::minutes(15), now)
            .await
            .unwrap();
        assert_eq!(window.window_start, now);
        assert!(window.healthy);
        assert!(store.all_current_windows(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_transaction_store() {
        let store = InMemoryTransactionStore::new();
        let tx = Transaction::new(
            "order-1",
            Amount::new(dec!(100.0)).unwrap(),
            PaymentInstrument::new("card"),
            "razorpay",
            Utc::now(),
        );

        assert!(!store.exists("order-1").await.unwrap());
        store.store(tx.clone()).await.unwrap();
        assert!(store.exists("order-1").await.unwrap());

        let retrieved = store.get("order-1").await.unwrap().unwrap();
        assert_eq!(retrieved, tx);
        assert!(store.get("order-2").await.unwrap().is_none());
    }
}
