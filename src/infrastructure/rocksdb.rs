use crate::domain::health::HealthWindow;
use crate::domain::ports::{HealthWindowStore, TransactionStore};
use crate::domain::transaction::Transaction;
use crate::error::{Result, RoutingError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing gateway health windows.
pub const CF_HEALTH_WINDOWS: &str = "health_windows";
/// Column Family for storing transactions by order id.
pub const CF_TRANSACTIONS: &str = "transactions";

/// A persistent store implementation using RocksDB.
///
/// Health windows are keyed by `gateway name, 0x00, window start`, so a
/// prefix scan walks one gateway's windows oldest first. Transactions are
/// keyed by order id. Values are JSON.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_windows = ColumnFamilyDescriptor::new(CF_HEALTH_WINDOWS, Options::default());
        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_windows, cf_transactions])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| RoutingError::internal(format!("{} column family not found", name)))
    }
}

fn gateway_prefix(gateway_name: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(gateway_name.len() + 1);
    prefix.extend_from_slice(gateway_name.as_bytes());
    prefix.push(0);
    prefix
}

// Sign bit flipped so that big-endian byte order matches time order.
fn window_key(gateway_name: &str, window_start: DateTime<Utc>) -> Vec<u8> {
    let mut key = gateway_prefix(gateway_name);
    let ordered = (window_start.timestamp_millis() as u64) ^ (1 << 63);
    key.extend_from_slice(&ordered.to_be_bytes());
    key
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        RoutingError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        RoutingError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl HealthWindowStore for RocksDBStore {
    async fn current(
        &self,
        gateway_name: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<HealthWindow>> {
        let cf = self.cf(CF_HEALTH_WINDOWS)?;
        let prefix = gateway_prefix(gateway_name);
        let start = window_key(gateway_name, since);

        let mut latest = None;
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(&start, Direction::Forward))
        {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            latest = Some(value);
        }

        latest.map(|bytes| from_json(&bytes)).transpose()
    }

    async fn save(&self, window: HealthWindow) -> Result<()> {
        let cf = self.cf(CF_HEALTH_WINDOWS)?;
        let key = window_key(&window.gateway_name, window.window_start);
        let value = to_json(&window)?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cf = self.cf(CF_HEALTH_WINDOWS)?;
        let mut batch = WriteBatch::default();
        let mut purged = 0;

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, value) = item?;
            let window: HealthWindow = from_json(&value)?;
            if window.window_start < cutoff {
                batch.delete_cf(cf, key);
                purged += 1;
            }
        }

        self.db.write(batch)?;
        Ok(purged)
    }

    async fn all_current_windows(&self, since: DateTime<Utc>) -> Result<Vec<HealthWindow>> {
        let cf = self.cf(CF_HEALTH_WINDOWS)?;
        let mut windows = Vec::new();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let window: HealthWindow = from_json(&value)?;
            if window.window_start >= since {
                windows.push(window);
            }
        }

        Ok(windows)
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn exists(&self, order_id: &str) -> Result<bool> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        // Just check if the key exists without retrieving the value
        let result = self.db.get_pinned_cf(cf, order_id.as_bytes())?;
        Ok(result.is_some())
    }

    async fn store(&self, tx: Transaction) -> Result<()> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let value = to_json(&tx)?;
        self.db.put_cf(cf, tx.order_id.as_bytes(), value)?;
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Transaction>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        self.db
            .get_cf(cf, order_id.as_bytes())?
            .map(|bytes| from_json(&bytes))
            .transpose()
    }
}
