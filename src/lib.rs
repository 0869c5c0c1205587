//! Health-aware payment gateway routing.
//!
//! Tracks each gateway's rolling success rate, takes gateways that fall below
//! the configured threshold out of rotation for a cooldown, and spreads
//! payments over the remaining ones by weight.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;
