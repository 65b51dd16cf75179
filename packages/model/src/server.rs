use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use wirebench_types::proto::image_classifier_server::ImageClassifierServer;
use wirebench_types::MAX_MESSAGE_BYTES;

use crate::delay::DelayStrategy;
use crate::service::ClassifierService;

pub fn classifier_server<D: DelayStrategy>(
    delay: D,
) -> ImageClassifierServer<ClassifierService<D>> {
    ImageClassifierServer::new(ClassifierService::new(delay))
        .max_decoding_message_size(MAX_MESSAGE_BYTES)
        .max_encoding_message_size(MAX_MESSAGE_BYTES)
}

/// Serves the classifier on an already bound listener until the task is dropped.
pub async fn serve<D: DelayStrategy>(
    listener: TcpListener,
    delay: D,
) -> Result<(), tonic::transport::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("[model-service] gRPC listening on {}", addr);
    }
    Server::builder()
        .add_service(classifier_server(delay))
        .serve_with_incoming(TcpListenerStream::new(listener))
        .await
}

/// Binds `addr` and serves in a background task. Returns the bound address,
/// which differs from `addr` when port 0 was requested.
pub async fn spawn<D: DelayStrategy>(
    addr: &str,
    delay: D,
) -> std::io::Result<(SocketAddr, JoinHandle<Result<(), tonic::transport::Error>>)> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    let handle = tokio::spawn(serve(listener, delay));
    Ok((local, handle))
}
