#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;

use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wirebench_gateway::{GatewayConfig, GatewayState};
use wirebench_types::schema;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    schema::init()?;

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        "Loaded configuration: http_port={}, grpc_port={}, model_addr={}",
        config.http_port,
        config.grpc_port,
        config.model_addr
    );

    let http = tokio::net::TcpListener::bind(config.http_bind_addr()).await?;
    let grpc = tokio::net::TcpListener::bind(config.grpc_bind_addr()).await?;
    let state = Arc::new(GatewayState::new(config));

    wirebench_gateway::server::serve(http, grpc, state).await?;

    Ok(())
}
