//! Lotwatch - parking lot occupancy collector.
//!
//! Samples the occupancy state of every parking lot listed on a public
//! directory page, normalizes each lot's status to a numeric level, and
//! merges the timestamped observations into a deduplicated Arrow table
//! in durable storage. One invocation runs one collection cycle.

pub mod collector;
pub mod config;
pub mod cycle;
pub mod dataset;
pub mod error;
pub mod scrape;
pub mod status;
pub mod store;

pub use config::Settings;
pub use cycle::{run_cycle, run_cycle_at, CycleReport};
pub use dataset::{Dataset, Observation};
pub use error::CycleError;
