use axum::{Router, extract::DefaultBodyLimit};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod forward;
pub mod grpc;
pub mod pipeline;
pub mod routes;
pub mod server;
pub mod state;
pub mod trpc;

pub use config::GatewayConfig;
pub use forward::{ForwardError, ModelForwarder};
pub use server::{BoundAddrs, GatewayError};
pub use state::{AppState, GatewayState};

/// Whole-request cap for REST and batched-RPC bodies.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

pub fn construct_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::upload::routes())
        .merge(trpc::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
}
