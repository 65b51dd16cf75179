#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use wirebench_gateway::{GatewayConfig, GatewayState, construct_router};
use wirebench_model::JitterDelay;
use wirebench_types::schema;

pub const BOUNDARY: &str = "wirebench-test-boundary";

/// Starts a model service on an ephemeral port and returns a gateway state
/// pointing at it.
pub async fn gateway_state() -> Arc<GatewayState> {
    schema::init().unwrap();
    let (model_addr, _handle) = wirebench_model::spawn("127.0.0.1:0", JitterDelay)
        .await
        .unwrap();
    Arc::new(GatewayState::new(GatewayConfig {
        http_port: 0,
        grpc_port: 0,
        model_addr: model_addr.to_string(),
    }))
}

pub async fn router() -> Router {
    construct_router(gateway_state().await)
}

/// State whose model address refuses connections.
pub fn unreachable_state() -> Arc<GatewayState> {
    Arc::new(GatewayState::new(GatewayConfig {
        http_port: 0,
        grpc_port: 0,
        model_addr: "127.0.0.1:1".to_string(),
    }))
}

pub fn image(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Hand-built `multipart/form-data` body with one file part per entry.
pub fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[(&str, &str, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn json_request(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response<Body> = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
