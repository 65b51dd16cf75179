use wirebench_types::schema;

use crate::clients::grpc::GrpcClient;
use crate::clients::rest::RestClient;
use crate::clients::trpc::TrpcClient;
use crate::clients::Measured;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::inputs::{self, InputImage};
use crate::record::{BenchmarkRecord, BenchmarkReport, Subject};
use crate::scenario::{Mode, Protocol, Scenario};

/// Executes scenarios one at a time against the configured endpoints.
pub struct Runner {
    config: HarnessConfig,
    rest: RestClient,
    trpc: TrpcClient,
    grpc_direct: GrpcClient,
    grpc_via_gateway: GrpcClient,
}

impl Runner {
    pub fn new(config: HarnessConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            rest: RestClient::new(http.clone(), config.api_url.clone()),
            trpc: TrpcClient::new(http, &config.api_url),
            grpc_direct: GrpcClient::new(&config.model_addr),
            grpc_via_gateway: GrpcClient::new(&config.api_grpc_addr),
            config,
        }
    }

    /// Runs the whole matrix in order. The first failing scenario aborts the run.
    /// The shared schema is loaded before any scenario starts.
    pub async fn run_all(&self) -> Result<BenchmarkReport, HarnessError> {
        schema::init()?;
        let mut records = Vec::new();
        for scenario in Scenario::canonical() {
            records.push(self.run(scenario).await?);
        }
        Ok(BenchmarkReport::new(records))
    }

    pub async fn run(&self, scenario: Scenario) -> Result<BenchmarkRecord, HarnessError> {
        let images = inputs::load(&self.config.images, scenario.mode.image_count()).await?;
        tracing::debug!(%scenario, images = images.len(), "Running scenario");

        let measured = self.call(scenario, &images).await.inspect_err(|err| {
            tracing::error!(%scenario, error = %err, "Scenario failed");
        })?;

        let subject = match scenario.mode {
            Mode::Single => Subject::Image(
                images
                    .first()
                    .map(|image| image.name.clone())
                    .unwrap_or_default(),
            ),
            Mode::Batch(_) => Subject::Count(images.len()),
        };
        let record = BenchmarkRecord {
            protocol: scenario.protocol,
            mode: scenario.mode,
            subject,
            ms: measured.ms,
            req_bytes: measured.req_bytes,
            res_bytes: measured.res_bytes,
            out: measured.out,
        };
        tracing::info!(%scenario, ms = record.ms, "Scenario complete");
        Ok(record)
    }

    async fn call(&self, scenario: Scenario, images: &[InputImage]) -> Result<Measured, HarnessError> {
        match (scenario.protocol, scenario.mode) {
            (Protocol::Rest, Mode::Single) => self.rest.upload_image(single(images)?).await,
            (Protocol::Rest, Mode::Batch(_)) => self.rest.upload_images(images).await,
            (Protocol::Trpc, Mode::Single) => self.trpc.upload_image(single(images)?).await,
            (Protocol::Trpc, Mode::Batch(_)) => self.trpc.upload_images(images).await,
            (Protocol::GrpcDirect, Mode::Single) => {
                self.grpc_direct.upload_image(single(images)?).await
            }
            (Protocol::GrpcDirect, Mode::Batch(_)) => self.grpc_direct.upload_images(images).await,
            (Protocol::GrpcViaGateway, Mode::Single) => {
                self.grpc_via_gateway.upload_image(single(images)?).await
            }
            (Protocol::GrpcViaGateway, Mode::Batch(_)) => {
                self.grpc_via_gateway.upload_images(images).await
            }
        }
    }
}

fn single(images: &[InputImage]) -> Result<&InputImage, HarnessError> {
    images
        .first()
        .ok_or_else(|| HarnessError::NoImages("./samples".into()))
}
