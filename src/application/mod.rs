//! Application layer: the health/routing core and the order flow around it.
//!
//! `HealthEvaluator` owns every health transition, `GatewaySelector` turns
//! configuration plus live health into one gateway name, and `PaymentRouter`
//! ties selection, the gateway call and outcome recording together.
//! `TransactionService` adds order bookkeeping on top of the router.

pub mod cleanup;
pub mod health;
pub mod monitoring;
pub mod router;
pub mod selector;
pub mod transactions;
