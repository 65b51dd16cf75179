use anyhow::Context;
use dotenv::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wirebench_harness::{HarnessConfig, Runner};
use wirebench_types::schema;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    schema::init()?;

    let config = HarnessConfig::from_env()?;
    let out_path = config.out_path.clone();

    let report = Runner::new(config)
        .run_all()
        .await
        .context("benchmark run aborted")?;
    report
        .write(&out_path)
        .await
        .with_context(|| format!("saving {}", out_path.display()))?;

    println!("Saved: {}", out_path.display());
    for record in &report.results {
        println!("{}", record.summary_line());
    }

    Ok(())
}
