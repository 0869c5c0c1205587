use crate::error::RoutingError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A strictly positive payment amount.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, RoutingError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(RoutingError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = RoutingError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Card or wallet details forwarded to the gateway untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentInstrument {
    pub kind: String,
    pub card_number: Option<String>,
    /// `MM/YY`
    pub expiry: Option<String>,
    pub cvv: Option<String>,
    pub holder_name: Option<String>,
}

impl PaymentInstrument {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.kind.trim().is_empty() {
            return Err(RoutingError::ValidationError(
                "Payment instrument type is required".to_string(),
            ));
        }
        if let Some(expiry) = &self.expiry
            && !is_valid_expiry(expiry)
        {
            return Err(RoutingError::ValidationError(
                "Expiry must be in MM/YY format".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_valid_expiry(expiry: &str) -> bool {
    let Some((month, year)) = expiry.split_once('/') else {
        return false;
    };
    let month_ok = month.len() == 2
        && month.chars().all(|c| c.is_ascii_digit())
        && month
            .parse::<u8>()
            .is_ok_and(|m| (1..=12).contains(&m));
    let year_ok = year.len() == 2 && year.chars().all(|c| c.is_ascii_digit());
    month_ok && year_ok
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Success,
    Failure,
}

/// The stored record of one order routed through a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: String,
    pub amount: Amount,
    pub instrument: PaymentInstrument,
    pub selected_gateway: String,
    pub status: TransactionStatus,
    pub gateway_transaction_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        order_id: impl Into<String>,
        amount: Amount,
        instrument: PaymentInstrument,
        selected_gateway: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            amount,
            instrument,
            selected_gateway: selected_gateway.into(),
            status: TransactionStatus::Pending,
            gateway_transaction_id: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}
