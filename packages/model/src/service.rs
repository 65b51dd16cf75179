use std::sync::Arc;
use std::time::Instant;

use tonic::{Request, Response, Status};
use wirebench_types::proto::image_classifier_server::ImageClassifier;
use wirebench_types::proto::{ImageRequest, ImageResponse, ImagesRequest, ImagesResponse};
use wirebench_types::{schema, ClassificationResult, ToProto};

use crate::classifier::{classify, Classification};
use crate::delay::DelayStrategy;

pub const IMAGE_DATA_REQUIRED: &str = "imageData is required";

/// gRPC implementation of the classification backend.
///
/// Holds no mutable state; clones share the same delay strategy.
pub struct ClassifierService<D> {
    delay: Arc<D>,
}

impl<D> Clone for ClassifierService<D> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay.clone(),
        }
    }
}

impl<D: DelayStrategy> ClassifierService<D> {
    pub fn new(delay: D) -> Self {
        Self {
            delay: Arc::new(delay),
        }
    }

    /// Classifies one image. `model_latency_ms` covers the whole call,
    /// simulated compute included.
    pub async fn classify(&self, image: &[u8]) -> Result<ClassificationResult, Status> {
        let started = Instant::now();
        if image.is_empty() {
            return Err(Status::invalid_argument(IMAGE_DATA_REQUIRED));
        }

        tokio::time::sleep(self.delay.delay_for(image)).await;

        let Classification { label, confidence } = classify(image);
        let model_latency_ms = u32::try_from(started.elapsed().as_millis()).unwrap_or(u32::MAX);
        Ok(ClassificationResult {
            label,
            confidence,
            model_latency_ms,
        })
    }
}

#[tonic::async_trait]
impl<D: DelayStrategy> ImageClassifier for ClassifierService<D> {
    async fn upload_image(
        &self,
        request: Request<ImageRequest>,
    ) -> Result<Response<ImageResponse>, Status> {
        let ImageRequest {
            image_data,
            filename,
        } = request.into_inner();

        match self.classify(&image_data).await {
            Ok(result) => {
                tracing::debug!(
                    filename = %filename,
                    bytes = image_data.len(),
                    label = %result.label,
                    latency_ms = result.model_latency_ms,
                    "Classified image"
                );
                Ok(Response::new(result.to_proto()))
            }
            Err(status) => {
                tracing::warn!(filename = %filename, error = %status.message(), "Rejected image");
                Err(status)
            }
        }
    }

    async fn upload_images(
        &self,
        _request: Request<ImagesRequest>,
    ) -> Result<Response<ImagesResponse>, Status> {
        Err(schema::unregistered("UploadImages"))
    }
}
