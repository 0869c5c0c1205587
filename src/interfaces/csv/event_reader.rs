use crate::application::transactions::{CallbackRequest, CallbackStatus, InitiateRequest};
use crate::domain::transaction::{Amount, PaymentInstrument};
use crate::error::{Result, RoutingError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Initiate,
    Callback,
}

/// One raw CSV row: `type, order_id, amount, instrument, gateway, status, reason`.
#[derive(Debug, Deserialize)]
struct EventRecord {
    r#type: EventType,
    order_id: String,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    instrument: Option<String>,
    #[serde(default)]
    gateway: Option<String>,
    #[serde(default)]
    status: Option<CallbackStatus>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Initiate(InitiateRequest),
    Callback(CallbackRequest),
}

impl TryFrom<EventRecord> for Event {
    type Error = RoutingError;

    fn try_from(record: EventRecord) -> Result<Self> {
        match record.r#type {
            EventType::Initiate => {
                let amount = record.amount.ok_or_else(|| {
                    RoutingError::ValidationError("Initiate event missing amount".to_string())
                })?;
                Ok(Event::Initiate(InitiateRequest {
                    order_id: record.order_id,
                    amount: Amount::new(amount)?,
                    instrument: PaymentInstrument::new(record.instrument.unwrap_or_default()),
                }))
            }
            EventType::Callback => {
                let gateway = record.gateway.ok_or_else(|| {
                    RoutingError::ValidationError("Callback event missing gateway".to_string())
                })?;
                let status = record.status.ok_or_else(|| {
                    RoutingError::ValidationError("Callback event missing status".to_string())
                })?;
                Ok(Event::Callback(CallbackRequest {
                    order_id: record.order_id,
                    status,
                    gateway,
                    reason: record.reason,
                }))
            }
        }
    }
}

/// Reads routing events from a CSV source.
///
/// Whitespace is trimmed and short rows are accepted; columns an event type
/// does not use may be left empty.
pub struct EventReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> EventReader<R> {
    /// Creates a new `EventReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and checks events.
    pub fn events(self) -> impl Iterator<Item = Result<Event>> {
        self.reader
            .into_deserialize::<EventRecord>()
            .map(|result| result.map_err(RoutingError::from).and_then(Event::try_from))
    }
}
