//! Full matrix against an in-process model service and gateway.

use std::path::Path;
use std::sync::Arc;

use wirebench_gateway::{GatewayConfig, GatewayState};
use wirebench_harness::{
    BenchmarkReport, HarnessConfig, ImageSource, Mode, Protocol, Runner, Subject,
};
use wirebench_model::JitterDelay;
use wirebench_types::proto::ImagesResponse;
use wirebench_types::schema;
use wirebench_types::wire::{image_request_size, images_request_size, images_response_size};

async fn start_services() -> (String, String, String) {
    schema::init().unwrap();
    let (model_addr, _) = wirebench_model::spawn("127.0.0.1:0", JitterDelay)
        .await
        .unwrap();
    let state = Arc::new(GatewayState::new(GatewayConfig {
        http_port: 0,
        grpc_port: 0,
        model_addr: model_addr.to_string(),
    }));
    let (gateway, _) = wirebench_gateway::server::spawn("127.0.0.1:0", "127.0.0.1:0", state)
        .await
        .unwrap();
    (
        format!("http://{}", gateway.http),
        gateway.grpc.to_string(),
        model_addr.to_string(),
    )
}

fn write_samples(dir: &Path) {
    for i in 0..6u8 {
        let bytes: Vec<u8> = (0..100u8).map(|b| b.wrapping_mul(i + 1)).collect();
        std::fs::write(dir.join(format!("sample-{}.bin", i)), bytes).unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_matrix_writes_report() {
    let (api_url, api_grpc_addr, model_addr) = start_services().await;
    let samples = tempfile::tempdir().unwrap();
    write_samples(samples.path());
    let out = tempfile::tempdir().unwrap();
    let out_path = out.path().join("benchmarks.json");

    let runner = Runner::new(HarnessConfig {
        api_url,
        api_grpc_addr,
        model_addr,
        out_path: out_path.clone(),
        images: ImageSource::SamplesDir(samples.path().to_path_buf()),
    });
    let report = runner.run_all().await.unwrap();
    report.write(&out_path).await.unwrap();

    let tags: Vec<String> = report
        .results
        .iter()
        .map(|r| format!("{} {}", r.protocol, r.mode))
        .collect();
    assert_eq!(
        tags,
        [
            "REST single",
            "REST batch5",
            "tRPC single",
            "tRPC batch5",
            "gRPC-direct single",
            "gRPC-direct batch5",
            "gRPC-via-microservice single",
            "gRPC-via-microservice batch5",
        ]
    );

    for record in &report.results {
        assert!(record.ms > 0.0, "{}", record.summary_line());
        assert!(record.res_bytes > 0);
        match record.mode {
            Mode::Single => assert_eq!(record.subject, Subject::Image("sample-0.bin".to_string())),
            Mode::Batch(_) => assert_eq!(record.subject, Subject::Count(5)),
        }
        if record.protocol == Protocol::Rest {
            assert_eq!(record.req_bytes, 0);
        } else {
            assert!(record.req_bytes > 100);
        }
    }

    let read = BenchmarkReport::read(&out_path).await.unwrap();
    assert_eq!(read, report);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gateway_hop_matches_direct_results() {
    let (api_url, api_grpc_addr, model_addr) = start_services().await;
    let samples = tempfile::tempdir().unwrap();
    write_samples(samples.path());

    let runner = Runner::new(HarnessConfig {
        api_url,
        api_grpc_addr,
        model_addr,
        out_path: samples.path().join("unused.json"),
        images: ImageSource::SamplesDir(samples.path().to_path_buf()),
    });
    let batch = Mode::Batch(5);
    let direct = runner
        .run(wirebench_harness::Scenario::new(Protocol::GrpcDirect, batch))
        .await
        .unwrap();
    let via_gateway = runner
        .run(wirebench_harness::Scenario::new(Protocol::GrpcViaGateway, batch))
        .await
        .unwrap();

    let pick = |out: &serde_json::Value| -> Vec<(String, String)> {
        out["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| (r["label"].to_string(), r["confidence"].to_string()))
            .collect()
    };
    assert_eq!(pick(&direct.out), pick(&via_gateway.out));
    assert_eq!(direct.req_bytes, via_gateway.req_bytes);
    assert_eq!(direct.res_bytes, via_gateway.res_bytes);
    assert!(via_gateway.ms >= direct.ms);
}

#[tokio::test]
async fn test_missing_inputs_abort_the_run() {
    let empty = tempfile::tempdir().unwrap();
    let runner = Runner::new(HarnessConfig {
        api_url: "http://127.0.0.1:1".to_string(),
        api_grpc_addr: "127.0.0.1:1".to_string(),
        model_addr: "127.0.0.1:1".to_string(),
        out_path: empty.path().join("benchmarks.json"),
        images: ImageSource::SamplesDir(empty.path().to_path_buf()),
    });
    let err = runner.run_all().await.unwrap_err();
    assert!(matches!(err, wirebench_harness::HarnessError::NoImages(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_grpc_batch_sizes_are_batch_message_sizes() {
    let (_, _, model_addr) = start_services().await;
    let samples = tempfile::tempdir().unwrap();
    write_samples(samples.path());
    let source = ImageSource::SamplesDir(samples.path().to_path_buf());
    let images = wirebench_harness::inputs::load(&source, 5).await.unwrap();

    let measured = wirebench_harness::clients::grpc::GrpcClient::new(&model_addr)
        .upload_images(&images)
        .await
        .unwrap();

    let batch_request =
        images_request_size(images.iter().map(|i| (i.bytes.as_slice(), i.name.as_str())));
    let per_call_requests: usize = images
        .iter()
        .map(|i| image_request_size(&i.bytes, &i.name))
        .sum();
    assert_eq!(measured.req_bytes, batch_request);
    assert_ne!(measured.req_bytes, per_call_requests);

    let response: ImagesResponse = serde_json::from_value(measured.out).unwrap();
    assert_eq!(response.results.len(), 5);
    assert_eq!(measured.res_bytes, images_response_size(&response.results));
}
