//! One client per surface. Each call returns what the surface answered plus
//! the request and response sizes in that surface's own wire format.

pub mod grpc;
pub mod rest;
pub mod trpc;

use serde_json::Value;

/// Result of one timed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured {
    pub ms: f64,
    pub req_bytes: usize,
    pub res_bytes: usize,
    pub out: Value,
}
