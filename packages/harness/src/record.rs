use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HarnessError;
use crate::scenario::{Mode, Protocol};

/// What a record measured: one named image or a batch of `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Subject {
    Image(String),
    Count(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRecord {
    pub protocol: Protocol,
    pub mode: Mode,
    #[serde(flatten)]
    pub subject: Subject,
    pub ms: f64,
    pub req_bytes: usize,
    pub res_bytes: usize,
    pub out: Value,
}

impl BenchmarkRecord {
    pub fn summary_line(&self) -> String {
        format!(
            "{} {} -> ms={} reqBytes={} resBytes={}",
            self.protocol, self.mode, self.ms, self.req_bytes, self.res_bytes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    pub generated_at: DateTime<Utc>,
    pub results: Vec<BenchmarkRecord>,
}

impl BenchmarkReport {
    pub fn new(results: Vec<BenchmarkRecord>) -> Self {
        Self {
            generated_at: Utc::now(),
            results,
        }
    }

    /// Writes the report as pretty-printed JSON, replacing any previous file.
    pub async fn write(&self, path: &Path) -> Result<(), HarnessError> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| HarnessError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.display(), records = self.results.len(), "Report written");
        Ok(())
    }

    pub async fn read(path: &Path) -> Result<Self, HarnessError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| HarnessError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
