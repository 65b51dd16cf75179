use std::time::Instant;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use wirebench_types::Label;
use wirebench_types::timing::elapsed_ms;

use crate::bad_request;
use crate::error::ApiError;
use crate::forward::BatchItem;
use crate::state::AppState;

pub const MAX_FILES: usize = 10;
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/uploadImage", post(upload_image))
        .route("/uploadImages", post(upload_images))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub label: Label,
    pub confidence: f64,
    pub model_latency_ms: u32,
    pub api_total_ms: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImagesResponse {
    pub count: usize,
    pub results: Vec<BatchItem>,
    pub api_total_ms: f64,
}

struct UploadedFile {
    filename: Option<String>,
    bytes: Vec<u8>,
}

/// Reads every file posted under `field`, rejecting more than `limit` of them.
/// Parts with other names are skipped.
async fn read_files(
    multipart: &mut Multipart,
    field: &str,
    limit: usize,
) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();
    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        if files.len() == limit {
            return Err(bad_request!(
                "Too many files in field '{}': at most {} allowed",
                field,
                limit
            ));
        }
        let filename = part.file_name().map(str::to_string);
        let bytes = part.bytes().await?;
        if bytes.len() > MAX_FILE_BYTES {
            return Err(bad_request!(
                "File too large: {} bytes, limit is {}",
                bytes.len(),
                MAX_FILE_BYTES
            ));
        }
        files.push(UploadedFile {
            filename,
            bytes: bytes.to_vec(),
        });
    }
    Ok(files)
}

#[tracing::instrument(name = "POST /uploadImage", skip_all)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| bad_request!("Missing field: image"))?;
    let file = read_files(&mut multipart, "image", 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| bad_request!("Missing field: image"))?;

    let started = Instant::now();
    let (result, _) = state.forwarder.classify(file.bytes, file.filename).await?;

    Ok(Json(UploadImageResponse {
        label: result.label,
        confidence: result.confidence,
        model_latency_ms: result.model_latency_ms,
        api_total_ms: elapsed_ms(started),
    }))
}

#[tracing::instrument(name = "POST /uploadImages", skip_all)]
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadImagesResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| bad_request!("Missing field: images"))?;
    let files = read_files(&mut multipart, "images", MAX_FILES).await?;
    if files.is_empty() {
        return Err(bad_request!("Missing field: images"));
    }

    let started = Instant::now();
    let results = state
        .forwarder
        .classify_batch(
            files
                .into_iter()
                .map(|file| (file.bytes, file.filename))
                .collect(),
        )
        .await?;
    tracing::info!(count = results.len(), "Classified uploaded batch");

    Ok(Json(UploadImagesResponse {
        count: results.len(),
        results,
        api_total_ms: elapsed_ms(started),
    }))
}
