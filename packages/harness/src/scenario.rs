use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Surface a scenario goes through, named as it appears in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "tRPC")]
    Trpc,
    #[serde(rename = "gRPC-direct")]
    GrpcDirect,
    #[serde(rename = "gRPC-via-microservice")]
    GrpcViaGateway,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Rest => "REST",
            Protocol::Trpc => "tRPC",
            Protocol::GrpcDirect => "gRPC-direct",
            Protocol::GrpcViaGateway => "gRPC-via-microservice",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `single` or `batch<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Mode {
    Single,
    Batch(usize),
}

impl Mode {
    pub fn image_count(&self) -> usize {
        match self {
            Mode::Single => 1,
            Mode::Batch(n) => *n,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("single"),
            Mode::Batch(n) => write!(f, "batch{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid mode: {0}")]
pub struct InvalidMode(pub String);

impl FromStr for Mode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "single" {
            return Ok(Mode::Single);
        }
        s.strip_prefix("batch")
            .and_then(|n| n.parse().ok())
            .map(Mode::Batch)
            .ok_or_else(|| InvalidMode(s.to_string()))
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.to_string()
    }
}

impl TryFrom<String> for Mode {
    type Error = InvalidMode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

pub const BATCH_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub protocol: Protocol,
    pub mode: Mode,
}

impl Scenario {
    pub const fn new(protocol: Protocol, mode: Mode) -> Self {
        Self { protocol, mode }
    }

    /// The fixed matrix, in execution order.
    pub fn canonical() -> [Scenario; 8] {
        let batch = Mode::Batch(BATCH_SIZE);
        [
            Scenario::new(Protocol::Rest, Mode::Single),
            Scenario::new(Protocol::Rest, batch),
            Scenario::new(Protocol::Trpc, Mode::Single),
            Scenario::new(Protocol::Trpc, batch),
            Scenario::new(Protocol::GrpcDirect, Mode::Single),
            Scenario::new(Protocol::GrpcDirect, batch),
            Scenario::new(Protocol::GrpcViaGateway, Mode::Single),
            Scenario::new(Protocol::GrpcViaGateway, batch),
        ]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.protocol, self.mode)
    }
}
