use std::path::PathBuf;

use wirebench_types::schema::SchemaError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(
        "No images provided. Put a few files in {0} or run with IMAGE=... or IMAGES=..."
    )]
    NoImages(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("Procedure {path} failed: {message}")]
    Procedure { path: String, message: String },
    #[error("gRPC call failed: {0}")]
    Grpc(#[from] tonic::Status),
    #[error("gRPC connection failed: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
