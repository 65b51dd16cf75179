//! Forwarding of classification calls to the model service.
//!
//! Every call dials a fresh gRPC connection; nothing is pooled or reused
//! between calls.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tonic::{Code, Status};
use wirebench_types::proto::image_classifier_client::ImageClassifierClient;
use wirebench_types::proto::{ImageRequest, ImageResponse};
use wirebench_types::timing::elapsed_ms;
use wirebench_types::{
    ClassificationResult, Label, MAX_MESSAGE_BYTES, UNKNOWN_FILENAME, UnknownLabel, grpc_endpoint,
};

use crate::pipeline::OrderedPipeline;

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Model service unreachable at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: tonic::transport::Error,
    },
    #[error("{}", .0.message())]
    Upstream(#[from] Status),
    #[error("Model service returned an invalid response: {0}")]
    Protocol(#[from] UnknownLabel),
}

impl ForwardError {
    pub fn code(&self) -> Code {
        match self {
            ForwardError::Connect { .. } => Code::Unavailable,
            ForwardError::Upstream(status) => status.code(),
            ForwardError::Protocol(_) => Code::Internal,
        }
    }

    /// gRPC representation. Upstream statuses are relayed unchanged.
    pub fn into_status(self) -> Status {
        match self {
            ForwardError::Upstream(status) => status,
            other => Status::new(other.code(), other.to_string()),
        }
    }
}

/// Raw reply of one forwarded call plus the gateway-side round trip.
#[derive(Debug, Clone)]
pub struct Forwarded {
    pub response: ImageResponse,
    pub total_ms: f64,
}

/// One entry of a batch result, shared by the REST and batched-RPC surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub filename: String,
    pub label: Label,
    pub confidence: f64,
    pub model_latency_ms: u32,
    pub total_ms: f64,
}

#[derive(Debug, Clone)]
pub struct ModelForwarder {
    model_addr: String,
    endpoint: String,
}

impl ModelForwarder {
    pub fn new(model_addr: impl Into<String>) -> Self {
        let model_addr = model_addr.into();
        let endpoint = grpc_endpoint(&model_addr);
        Self {
            model_addr,
            endpoint,
        }
    }

    pub fn model_addr(&self) -> &str {
        &self.model_addr
    }

    /// Sends one image to the model's `UploadImage` over a new connection.
    pub async fn forward(
        &self,
        image_data: Vec<u8>,
        filename: Option<String>,
    ) -> Result<Forwarded, ForwardError> {
        let started = Instant::now();
        let mut client = ImageClassifierClient::connect(self.endpoint.clone())
            .await
            .map_err(|source| ForwardError::Connect {
                addr: self.model_addr.clone(),
                source,
            })?
            .max_decoding_message_size(MAX_MESSAGE_BYTES)
            .max_encoding_message_size(MAX_MESSAGE_BYTES);

        let request = ImageRequest {
            image_data,
            filename: filename.unwrap_or_else(|| UNKNOWN_FILENAME.to_string()),
        };
        let response = client.upload_image(request).await?.into_inner();

        Ok(Forwarded {
            response,
            total_ms: elapsed_ms(started),
        })
    }

    /// Forwards and reshapes the reply into a [`ClassificationResult`].
    pub async fn classify(
        &self,
        image_data: Vec<u8>,
        filename: Option<String>,
    ) -> Result<(ClassificationResult, f64), ForwardError> {
        let forwarded = self.forward(image_data, filename).await?;
        let result = ClassificationResult::try_from(forwarded.response)?;
        Ok((result, forwarded.total_ms))
    }

    /// Forwards each image as its own call through an [`OrderedPipeline`].
    pub async fn classify_batch(
        &self,
        images: Vec<(Vec<u8>, Option<String>)>,
    ) -> Result<Vec<BatchItem>, ForwardError> {
        OrderedPipeline
            .run(images, |index, (image_data, filename)| async move {
                let filename = filename.unwrap_or_else(|| UNKNOWN_FILENAME.to_string());
                let (result, total_ms) = self.classify(image_data, Some(filename.clone())).await?;
                tracing::debug!(index, filename = %filename, label = %result.label, "Forwarded batch item");
                Ok(BatchItem {
                    filename,
                    label: result.label,
                    confidence: result.confidence,
                    model_latency_ms: result.model_latency_ms,
                    total_ms,
                })
            })
            .await
    }
}
