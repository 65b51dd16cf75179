use std::time::Instant;

use serde_json::{Value, json};
use wirebench_types::base64::{engine::general_purpose::STANDARD, Engine};
use wirebench_types::timing::elapsed_ms;
use wirebench_types::wire::json_size;
use wirebench_types::Envelope;

use super::Measured;
use crate::error::HarnessError;
use crate::inputs::InputImage;

/// Batch-link client: every call goes out as a one-item batch, the way a
/// tRPC client with an HTTP batch link sends a lone mutation.
#[derive(Debug, Clone)]
pub struct TrpcClient {
    http: reqwest::Client,
    base_url: String,
}

impl TrpcClient {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        Self {
            http,
            base_url: format!("{}/trpc", api_url),
        }
    }

    pub async fn upload_image(&self, image: &InputImage) -> Result<Measured, HarnessError> {
        self.mutate("uploadImage", image_input(image)).await
    }

    pub async fn upload_images(&self, images: &[InputImage]) -> Result<Measured, HarnessError> {
        let images: Vec<Value> = images.iter().map(image_input).collect();
        self.mutate("uploadImages", json!({ "images": images })).await
    }

    /// Sizes count the procedure input and output, not the envelope around them.
    pub async fn mutate(&self, path: &str, input: Value) -> Result<Measured, HarnessError> {
        let url = format!("{}/{}?batch=1", self.base_url, path);
        let envelope = Envelope::encode(&input)?;
        let body = json!({ "0": envelope });

        let started = Instant::now();
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let items: Vec<Value> = serde_json::from_str(&text).map_err(|_| HarnessError::Status {
            url: url.clone(),
            status,
            body: text.clone(),
        })?;
        let out = unwrap_item(path, items.into_iter().next())?;
        let ms = elapsed_ms(started);

        Ok(Measured {
            ms,
            req_bytes: json_size(&input)?,
            res_bytes: json_size(&out)?,
            out,
        })
    }
}

fn image_input(image: &InputImage) -> Value {
    json!({
        "filename": image.name,
        "imageBase64": STANDARD.encode(&image.bytes),
    })
}

fn unwrap_item(path: &str, item: Option<Value>) -> Result<Value, HarnessError> {
    let procedure_error = |message: String| HarnessError::Procedure {
        path: path.to_string(),
        message,
    };
    let mut item = item.ok_or_else(|| procedure_error("empty batch response".to_string()))?;

    if let Some(error) = item.get("error") {
        let message = error["json"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        return Err(procedure_error(message));
    }
    let data = item
        .get_mut("result")
        .and_then(|result| result.get_mut("data"))
        .map(Value::take)
        .ok_or_else(|| procedure_error("response item has neither result nor error".to_string()))?;
    let envelope: Envelope = serde_json::from_value(data)?;
    Ok(envelope.into_value())
}
