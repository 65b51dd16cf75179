#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wirebench_model::{JitterDelay, ModelConfig};
use wirebench_types::schema;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let schema = schema::init()?;
    tracing::info!("Loaded schema for {}", schema.full_service_name());

    let config = ModelConfig::from_env()?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr()?).await?;
    wirebench_model::serve(listener, JitterDelay).await?;

    Ok(())
}
