use std::time::Instant;

use tonic::transport::Channel;
use wirebench_types::proto::image_classifier_client::ImageClassifierClient;
use wirebench_types::proto::{ImageRequest, ImageResult, ImagesResponse};
use wirebench_types::timing::elapsed_ms;
use wirebench_types::wire::{
    image_response_size, images_request_size, images_response_size, proto_size,
};
use wirebench_types::{grpc_endpoint, MAX_MESSAGE_BYTES};

use super::Measured;
use crate::error::HarnessError;
use crate::inputs::InputImage;

/// Calls one `ImageClassifier` endpoint, either the model itself or the
/// gateway's passthrough. The connection is opened inside the timed window.
#[derive(Debug, Clone)]
pub struct GrpcClient {
    endpoint: String,
}

impl GrpcClient {
    pub fn new(addr: &str) -> Self {
        Self {
            endpoint: grpc_endpoint(addr),
        }
    }

    async fn connect(&self) -> Result<ImageClassifierClient<Channel>, HarnessError> {
        Ok(ImageClassifierClient::connect(self.endpoint.clone())
            .await?
            .max_decoding_message_size(MAX_MESSAGE_BYTES)
            .max_encoding_message_size(MAX_MESSAGE_BYTES))
    }

    pub async fn upload_image(&self, image: &InputImage) -> Result<Measured, HarnessError> {
        let request = request(image);
        let req_bytes = proto_size(&request);

        let started = Instant::now();
        let mut client = self.connect().await?;
        let response = client.upload_image(request).await?.into_inner();
        let ms = elapsed_ms(started);

        Ok(Measured {
            ms,
            req_bytes,
            res_bytes: image_response_size(&response),
            out: serde_json::to_value(&response)?,
        })
    }

    /// `UploadImages` is not served, so the batch goes out as sequential
    /// `UploadImage` calls over one connection.
    ///
    /// The reported sizes are not the bytes that crossed the wire. They are
    /// the encoded sizes of the `ImagesRequest` and `ImagesResponse` a single
    /// batch call would have carried, computed locally from the same inputs
    /// and replies. The wire itself carried N `ImageRequest` and N
    /// `ImageResponse` frames.
    pub async fn upload_images(&self, images: &[InputImage]) -> Result<Measured, HarnessError> {
        let req_bytes = images_request_size(
            images
                .iter()
                .map(|image| (image.bytes.as_slice(), image.name.as_str())),
        );

        let started = Instant::now();
        let mut client = self.connect().await?;
        let mut results = Vec::with_capacity(images.len());
        for image in images {
            let response = client.upload_image(request(image)).await?.into_inner();
            results.push(ImageResult::from_response(image.name.clone(), response));
        }
        let ms = elapsed_ms(started);

        let res_bytes = images_response_size(&results);
        let response = ImagesResponse { results };
        Ok(Measured {
            ms,
            req_bytes,
            res_bytes,
            out: serde_json::to_value(&response)?,
        })
    }
}

fn request(image: &InputImage) -> ImageRequest {
    ImageRequest {
        image_data: image.bytes.clone(),
        filename: image.name.clone(),
    }
}
