#![allow(dead_code)]

use payroute::application::health::HealthEvaluator;
use payroute::application::selector::{GatewaySelector, RandomSource};
use payroute::config::{GatewayDescriptor, HealthConfig};
use payroute::domain::clock::ManualClock;
use payroute::infrastructure::in_memory::InMemoryHealthStore;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const EVENTS_HEADER: [&str; 7] = [
    "type",
    "order_id",
    "amount",
    "instrument",
    "gateway",
    "status",
    "reason",
];

/// Writes `rows` initiate events with order ids `order-1..=order-rows`.
pub fn generate_events_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(EVENTS_HEADER)?;
    for i in 1..=rows {
        let order_id = format!("order-{}", i);
        wtr.write_record(["initiate", &order_id, "10.00", "card", "", "", ""])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn razorpay_payu_cashfree() -> Vec<GatewayDescriptor> {
    vec![
        GatewayDescriptor::new("razorpay", 40, true),
        GatewayDescriptor::new("payu", 35, true),
        GatewayDescriptor::new("cashfree", 25, true),
    ]
}

/// Evaluator on an in-memory store with a manually driven clock
/// (threshold 50%, 15 minute window, 5 minute cooldown).
pub fn manual_evaluator() -> (Arc<HealthEvaluator>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let evaluator = Arc::new(HealthEvaluator::new(
        Box::new(InMemoryHealthStore::new()),
        HealthConfig::default(),
        clock.clone(),
    ));
    (evaluator, clock)
}

pub fn selector(
    evaluator: Arc<HealthEvaluator>,
    random: Box<dyn RandomSource>,
) -> GatewaySelector {
    GatewaySelector::with_random(razorpay_payu_cashfree(), evaluator, random)
}
