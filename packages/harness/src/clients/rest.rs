use std::time::Instant;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use wirebench_types::timing::elapsed_ms;
use wirebench_types::wire::json_size;

use super::Measured;
use crate::error::HarnessError;
use crate::inputs::InputImage;

/// Multipart client for `/uploadImage` and `/uploadImages`.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
}

impl RestClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
        }
    }

    pub async fn upload_image(&self, image: &InputImage) -> Result<Measured, HarnessError> {
        let form = Form::new().part("image", part(image));
        self.post("/uploadImage", form).await
    }

    pub async fn upload_images(&self, images: &[InputImage]) -> Result<Measured, HarnessError> {
        let form = images
            .iter()
            .fold(Form::new(), |form, image| form.part("images", part(image)));
        self.post("/uploadImages", form).await
    }

    // Multipart framing is not counted; reqBytes is always 0 here.
    async fn post(&self, route: &str, form: Form) -> Result<Measured, HarnessError> {
        let url = format!("{}{}", self.api_url, route);
        let started = Instant::now();
        let response = self.http.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(HarnessError::Status { url, status, body });
        }
        let out: Value = response.json().await?;
        let ms = elapsed_ms(started);

        Ok(Measured {
            ms,
            req_bytes: 0,
            res_bytes: json_size(&out)?,
            out,
        })
    }
}

fn part(image: &InputImage) -> Part {
    Part::bytes(image.bytes.clone()).file_name(image.name.clone())
}
