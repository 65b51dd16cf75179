//! Classification backend.
//!
//! A stateless gRPC service whose "model" is a hash of the uploaded bytes,
//! with an injectable delay to make latency comparisons meaningful.

pub mod classifier;
pub mod config;
pub mod delay;
pub mod server;
pub mod service;

pub use classifier::{classify, Classification};
pub use config::ModelConfig;
pub use delay::{DelayStrategy, JitterDelay, NoDelay};
pub use server::{classifier_server, serve, spawn};
pub use service::{ClassifierService, IMAGE_DATA_REQUIRED};
