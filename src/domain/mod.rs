//! Domain layer: value types and the ports the application layer talks through.
//!
//! Nothing in here performs I/O; stores, gateways and clocks are reached only
//! through the traits in [`ports`] and [`clock`].

pub mod clock;
pub mod health;
pub mod ports;
pub mod transaction;
