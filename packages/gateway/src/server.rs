use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::state::AppState;
use crate::{construct_router, grpc};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

pub async fn serve_http(listener: TcpListener, state: AppState) -> Result<(), GatewayError> {
    tracing::info!("[api-service] HTTP listening on {}", listener.local_addr()?);
    axum::serve(listener, construct_router(state)).await?;
    Ok(())
}

/// Runs the HTTP and gRPC listeners until either fails.
pub async fn serve(
    http: TcpListener,
    grpc: TcpListener,
    state: AppState,
) -> Result<(), GatewayError> {
    let forwarder = state.forwarder.clone();
    tokio::try_join!(serve_http(http, state), async {
        grpc::serve(grpc, forwarder).await.map_err(GatewayError::from)
    })?;
    Ok(())
}

#[derive(Debug, Clone, Copy)]
pub struct BoundAddrs {
    pub http: SocketAddr,
    pub grpc: SocketAddr,
}

/// Binds both listeners and serves in a background task. Ports may be 0.
pub async fn spawn(
    http_addr: &str,
    grpc_addr: &str,
    state: AppState,
) -> Result<(BoundAddrs, JoinHandle<Result<(), GatewayError>>), GatewayError> {
    let http = TcpListener::bind(http_addr).await?;
    let grpc = TcpListener::bind(grpc_addr).await?;
    let addrs = BoundAddrs {
        http: http.local_addr()?,
        grpc: grpc.local_addr()?,
    };
    let handle = tokio::spawn(serve(http, grpc, state));
    Ok((addrs, handle))
}
