//! Benchmark driver for the wirebench services.
//!
//! Runs the eight canonical scenarios (four surfaces, single and batch)
//! strictly one after another and collects one [`BenchmarkRecord`] each.

pub mod clients;
pub mod config;
pub mod error;
pub mod inputs;
pub mod record;
pub mod runner;
pub mod scenario;

pub use config::{HarnessConfig, ImageSource};
pub use error::HarnessError;
pub use record::{BenchmarkRecord, BenchmarkReport, Subject};
pub use runner::Runner;
pub use scenario::{Mode, Protocol, Scenario};
