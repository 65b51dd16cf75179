//! Batched JSON-RPC surface compatible with the tRPC HTTP batch link.
//!
//! `POST /trpc/uploadImage,uploadImages?batch=1` with a body of
//! `{"0": {"json": ...}, "1": {"json": ...}}` runs both procedures one after
//! the other and answers with an array in the same order.

pub mod error;
pub mod procedures;

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use wirebench_types::Envelope;

use crate::forward::ModelForwarder;
use crate::pipeline::OrderedPipeline;
use crate::state::AppState;
use error::{TrpcCode, TrpcError};
use procedures::Procedure;

pub fn routes() -> Router<AppState> {
    Router::new().route("/trpc/{procedures}", post(call))
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    batch: Option<String>,
}

impl BatchQuery {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

type Outcome = Result<Envelope, TrpcError>;

#[tracing::instrument(name = "POST /trpc", skip(state, query, body))]
pub async fn call(
    State(state): State<AppState>,
    Path(procedures): Path<String>,
    Query(query): Query<BatchQuery>,
    body: Bytes,
) -> Response {
    let batch = query.is_batch();
    let paths: Vec<&str> = procedures.split(',').collect();

    if !batch && paths.len() > 1 {
        let err = TrpcError::bad_request("Multiple procedures require ?batch=1");
        let outcome: Outcome = Err(err);
        let (status, item) = render(&procedures, &outcome);
        return (status, Json(item)).into_response();
    }

    let inputs = match parse_inputs(&body, paths.len(), batch) {
        Ok(inputs) => inputs,
        Err(err) => vec![Err(err); paths.len()],
    };

    let forwarder = &state.forwarder;
    let outcomes = OrderedPipeline
        .run(paths.iter().zip(inputs), |index, (path, input)| async move {
            let outcome = execute(forwarder, path, input).await;
            if let Err(err) = &outcome {
                tracing::debug!(index, path, code = err.code.as_str(), "Procedure failed");
            }
            Ok::<_, Infallible>(outcome)
        })
        .await
        .unwrap_or_else(|never| match never {});

    let rendered: Vec<(StatusCode, Value)> = paths
        .iter()
        .zip(&outcomes)
        .map(|(path, outcome)| render(path, outcome))
        .collect();

    if !batch {
        let Some((status, item)) = rendered.into_iter().next() else {
            return StatusCode::NOT_FOUND.into_response();
        };
        return (status, Json(item)).into_response();
    }

    let status = batch_status(rendered.iter().map(|(status, _)| *status));
    let items: Vec<Value> = rendered.into_iter().map(|(_, item)| item).collect();
    (status, Json(items)).into_response()
}

/// One decoded input per requested procedure. A missing input becomes `null`
/// and is left to the procedure's own input validation.
fn parse_inputs(
    body: &[u8],
    count: usize,
    batch: bool,
) -> Result<Vec<Result<Value, TrpcError>>, TrpcError> {
    if body.is_empty() {
        return Ok(vec![Ok(Value::Null); count]);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| TrpcError::new(TrpcCode::ParseError, format!("Unable to parse body: {}", e)))?;

    if !batch {
        return Ok(vec![decode_envelope(Some(value))]);
    }
    let Value::Object(mut entries) = value else {
        return Err(TrpcError::bad_request(
            "Batch body must be an object keyed by call index",
        ));
    };
    Ok((0..count)
        .map(|index| decode_envelope(entries.remove(&index.to_string())))
        .collect())
}

fn decode_envelope(value: Option<Value>) -> Result<Value, TrpcError> {
    match value {
        None | Some(Value::Null) => Ok(Value::Null),
        Some(value) => {
            let envelope: Envelope = serde_json::from_value(value)?;
            Ok(envelope.into_value())
        }
    }
}

async fn execute(
    forwarder: &ModelForwarder,
    path: &str,
    input: Result<Value, TrpcError>,
) -> Outcome {
    let procedure = Procedure::from_path(path).ok_or_else(|| {
        TrpcError::not_found(format!("No procedure found on path \"{}\"", path))
    })?;
    let input = input?;
    let encoded = match procedure {
        Procedure::UploadImage => {
            let output = procedures::upload_image(forwarder, serde_json::from_value(input)?).await?;
            Envelope::encode(&output)
        }
        Procedure::UploadImages => {
            let output = procedures::upload_images(forwarder, serde_json::from_value(input)?).await?;
            Envelope::encode(&output)
        }
    };
    encoded.map_err(|e| TrpcError::new(TrpcCode::InternalServerError, e.to_string()))
}

fn render(path: &str, outcome: &Outcome) -> (StatusCode, Value) {
    match outcome {
        Ok(envelope) => (StatusCode::OK, json!({ "result": { "data": envelope } })),
        Err(err) => (
            err.code.http_status(),
            json!({ "error": err.to_envelope(path) }),
        ),
    }
}

fn batch_status(mut statuses: impl Iterator<Item = StatusCode>) -> StatusCode {
    let Some(first) = statuses.next() else {
        return StatusCode::OK;
    };
    if statuses.all(|status| status == first) {
        first
    } else {
        StatusCode::MULTI_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_status() {
        assert_eq!(batch_status([StatusCode::OK, StatusCode::OK].into_iter()), StatusCode::OK);
        assert_eq!(
            batch_status([StatusCode::BAD_REQUEST, StatusCode::BAD_REQUEST].into_iter()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            batch_status([StatusCode::OK, StatusCode::NOT_FOUND].into_iter()),
            StatusCode::MULTI_STATUS
        );
    }

    #[test]
    fn test_parse_inputs_unwraps_envelopes_by_index() {
        let body = br#"{"1": {"json": {"imageBase64": "AAE="}}, "0": {"json": {"imageBase64": ""}}}"#;
        let inputs = parse_inputs(body, 3, true).unwrap();
        assert_eq!(inputs[0].as_ref().unwrap(), &json!({"imageBase64": ""}));
        assert_eq!(inputs[1].as_ref().unwrap(), &json!({"imageBase64": "AAE="}));
        assert_eq!(inputs[2].as_ref().unwrap(), &Value::Null);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = parse_inputs(b"{not json", 1, true).unwrap_err();
        assert_eq!(err.code, TrpcCode::ParseError);
        assert_eq!(err.code.json_rpc_code(), -32700);
    }

    #[test]
    fn test_render_success_item() {
        let outcome: Outcome = Ok(Envelope::encode(&json!({"count": 0})).unwrap());
        let (status, item) = render("uploadImages", &outcome);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item, json!({"result": {"data": {"json": {"count": 0}}}}));
    }
}
