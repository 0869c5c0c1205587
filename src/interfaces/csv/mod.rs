//! CSV adapters used by the command-line driver.

pub mod event_reader;
pub mod report_writer;
