use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("No healthy gateways available")]
    NoAvailableGateway,
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Transaction with order ID {0} already exists")]
    DuplicateOrder(String),
    #[error("Transaction not found for order ID: {0}")]
    TransactionNotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDBError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl RoutingError {
    /// Errors caused by the request itself rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateOrder(_) | Self::TransactionNotFound(_) | Self::ValidationError(_)
        )
    }

    /// Errors that mean no gateway could take the payment right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NoAvailableGateway | Self::ServiceUnavailable(_))
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Failure modes of a single payment attempt against an upstream gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("gateway call timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}
