use std::time::Instant;

use serde::{Deserialize, Serialize};
use wirebench_types::Label;
use wirebench_types::base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use wirebench_types::timing::elapsed_ms;

use super::error::TrpcError;
use crate::forward::{BatchItem, ModelForwarder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    UploadImage,
    UploadImages,
}

impl Procedure {
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "uploadImage" => Some(Procedure::UploadImage),
            "uploadImages" => Some(Procedure::UploadImages),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub image_base64: String,
}

impl ImageInput {
    fn decode(self) -> Result<(Vec<u8>, Option<String>), TrpcError> {
        let bytes = BASE64
            .decode(self.image_base64.as_bytes())
            .map_err(|e| TrpcError::bad_request(format!("imageBase64 is not valid base64: {}", e)))?;
        Ok((bytes, self.filename))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesInput {
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageOutput {
    pub label: Label,
    pub confidence: f64,
    pub model_latency_ms: u32,
    pub total_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImagesOutput {
    pub count: usize,
    pub results: Vec<BatchItem>,
    pub total_ms: f64,
}

/// `totalMs` is the forwarded call's own round trip.
pub async fn upload_image(
    forwarder: &ModelForwarder,
    input: ImageInput,
) -> Result<UploadImageOutput, TrpcError> {
    let (image_data, filename) = input.decode()?;
    let (result, total_ms) = forwarder.classify(image_data, filename).await?;
    Ok(UploadImageOutput {
        label: result.label,
        confidence: result.confidence,
        model_latency_ms: result.model_latency_ms,
        total_ms,
    })
}

/// Every image is decoded before the first one is forwarded, so malformed
/// input never reaches the model.
pub async fn upload_images(
    forwarder: &ModelForwarder,
    input: ImagesInput,
) -> Result<UploadImagesOutput, TrpcError> {
    let images = input
        .images
        .into_iter()
        .map(ImageInput::decode)
        .collect::<Result<Vec<_>, _>>()?;

    let started = Instant::now();
    let results = forwarder.classify_batch(images).await?;
    Ok(UploadImagesOutput {
        count: results.len(),
        results,
        total_ms: elapsed_ms(started),
    })
}
