//! End-to-end checks of the model service over a real gRPC connection.

use std::time::{Duration, Instant};

use tonic::Code;
use wirebench_model::{spawn, DelayStrategy, JitterDelay, IMAGE_DATA_REQUIRED};
use wirebench_types::proto::image_classifier_client::ImageClassifierClient;
use wirebench_types::proto::{ImageRequest, ImagesRequest};
use wirebench_types::{grpc_endpoint, schema, Label};

async fn client() -> ImageClassifierClient<tonic::transport::Channel> {
    schema::init().unwrap();
    let (addr, _handle) = spawn("127.0.0.1:0", JitterDelay).await.unwrap();
    ImageClassifierClient::connect(grpc_endpoint(&addr.to_string()))
        .await
        .unwrap()
}

fn request(image_data: Vec<u8>) -> ImageRequest {
    ImageRequest {
        image_data,
        filename: "sample.bin".to_string(),
    }
}

#[tokio::test]
async fn test_repeated_calls_are_deterministic() {
    let mut client = client().await;
    let image: Vec<u8> = (0..100u8).collect();

    let first = client.upload_image(request(image.clone())).await.unwrap().into_inner();
    let second = client.upload_image(request(image)).await.unwrap().into_inner();

    assert_eq!(first.label, second.label);
    assert_eq!(first.confidence, second.confidence);
    assert!(first.label.parse::<Label>().is_ok());
    assert!((0.55..=0.99).contains(&f64::from(first.confidence)));
    assert!(first.model_latency_ms >= 10);
    assert!(second.model_latency_ms >= 10);
}

#[tokio::test]
async fn test_empty_image_is_rejected() {
    let mut client = client().await;
    let status = client.upload_image(request(Vec::new())).await.unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), IMAGE_DATA_REQUIRED);
}

#[tokio::test]
async fn test_batch_method_is_not_registered() {
    let mut client = client().await;
    let status = client
        .upload_images(ImagesRequest {
            images: vec![request(vec![1, 2, 3])],
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);
}

#[tokio::test(flavor = "current_thread")]
async fn test_concurrent_calls_overlap_their_delays() {
    let client = client().await;
    // first byte 20 -> 30 ms simulated compute per call
    let image = vec![20u8; 64];
    let per_call = JitterDelay.delay_for(&image);
    assert_eq!(per_call, Duration::from_millis(30));

    let call = |mut client: ImageClassifierClient<tonic::transport::Channel>, image: Vec<u8>| async move {
        client.upload_image(request(image)).await.map(|r| r.into_inner())
    };

    let started = Instant::now();
    let (a, b, c, d) = tokio::join!(
        call(client.clone(), image.clone()),
        call(client.clone(), image.clone()),
        call(client.clone(), image.clone()),
        call(client, image),
    );
    let elapsed = started.elapsed();

    for response in [a, b, c, d] {
        assert!(response.unwrap().model_latency_ms >= 30);
    }
    assert!(
        elapsed < per_call * 4,
        "four concurrent calls took {:?}, serial execution would take {:?}",
        elapsed,
        per_call * 4
    );
}
