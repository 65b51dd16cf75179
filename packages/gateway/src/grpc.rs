//! Binary-RPC passthrough: same contract as the model service, every call
//! relayed to the model over a fresh connection.

use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use wirebench_types::MAX_MESSAGE_BYTES;
use wirebench_types::proto::image_classifier_server::{ImageClassifier, ImageClassifierServer};
use wirebench_types::proto::{ImageRequest, ImageResponse, ImagesRequest, ImagesResponse};
use wirebench_types::schema;

use crate::forward::ModelForwarder;

#[derive(Debug, Clone)]
pub struct GatewayClassifier {
    forwarder: ModelForwarder,
}

impl GatewayClassifier {
    pub fn new(forwarder: ModelForwarder) -> Self {
        Self { forwarder }
    }

    pub fn into_server(self) -> ImageClassifierServer<Self> {
        ImageClassifierServer::new(self)
            .max_decoding_message_size(MAX_MESSAGE_BYTES)
            .max_encoding_message_size(MAX_MESSAGE_BYTES)
    }
}

#[tonic::async_trait]
impl ImageClassifier for GatewayClassifier {
    async fn upload_image(
        &self,
        request: Request<ImageRequest>,
    ) -> Result<Response<ImageResponse>, Status> {
        let ImageRequest {
            image_data,
            filename,
        } = request.into_inner();
        let filename = (!filename.is_empty()).then_some(filename);

        match self.forwarder.forward(image_data, filename).await {
            Ok(forwarded) => {
                tracing::debug!(
                    label = %forwarded.response.label,
                    total_ms = forwarded.total_ms,
                    "Relayed UploadImage"
                );
                Ok(Response::new(forwarded.response))
            }
            Err(err) => {
                tracing::warn!(code = ?err.code(), error = %err, "UploadImage relay failed");
                Err(err.into_status())
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

pub async fn serve(
    listener: TcpListener,
    forwarder: ModelForwarder,
) -> Result<(), tonic::transport::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("[api-service] gRPC listening on {}", addr);
    }
    Server::builder()
        .add_service(GatewayClassifier::new(forwarder).into_server())
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
}
