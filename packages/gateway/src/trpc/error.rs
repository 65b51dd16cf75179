use axum::http::StatusCode;
use serde_json::json;
use tonic::Code;
use wirebench_types::Envelope;

use crate::forward::ForwardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrpcCode {
    ParseError,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl TrpcCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrpcCode::ParseError => "PARSE_ERROR",
            TrpcCode::BadRequest => "BAD_REQUEST",
            TrpcCode::NotFound => "NOT_FOUND",
            TrpcCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// JSON-RPC 2.0 error number carried in the error body.
    pub fn json_rpc_code(&self) -> i32 {
        match self {
            TrpcCode::ParseError => -32700,
            TrpcCode::BadRequest => -32600,
            TrpcCode::NotFound => -32004,
            TrpcCode::InternalServerError => -32603,
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            TrpcCode::ParseError | TrpcCode::BadRequest => StatusCode::BAD_REQUEST,
            TrpcCode::NotFound => StatusCode::NOT_FOUND,
            TrpcCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct TrpcError {
    pub code: TrpcCode,
    pub message: String,
}

impl TrpcError {
    pub fn new(code: TrpcCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(TrpcCode::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TrpcCode::NotFound, message)
    }

    /// Error shape of one response item, wrapped in the wire envelope.
    pub fn to_envelope(&self, path: &str) -> Envelope {
        Envelope {
            json: json!({
                "message": self.message,
                "code": self.code.json_rpc_code(),
                "data": {
                    "code": self.code.as_str(),
                    "httpStatus": self.code.http_status().as_u16(),
                    "path": path,
                },
            }),
            meta: None,
        }
    }
}

impl From<ForwardError> for TrpcError {
    fn from(err: ForwardError) -> Self {
        let code = match err.code() {
            Code::InvalidArgument => TrpcCode::BadRequest,
            _ => TrpcCode::InternalServerError,
        };
        tracing::warn!(code = code.as_str(), error = %err, "Procedure failed upstream");
        Self::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for TrpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::bad_request(format!("Invalid input: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Status;

    #[test]
    fn test_error_envelope_shape() {
        let err = TrpcError::from(ForwardError::from(Status::invalid_argument(
            "imageData is required",
        )));
        let envelope = err.to_envelope("uploadImage");
        assert_eq!(
            envelope.json,
            json!({
                "message": "imageData is required",
                "code": -32600,
                "data": {"code": "BAD_REQUEST", "httpStatus": 400, "path": "uploadImage"}
            })
        );
    }

    #[test]
    fn test_upstream_outage_is_internal() {
        let err = TrpcError::from(ForwardError::from(Status::unavailable("down")));
        assert_eq!(err.code, TrpcCode::InternalServerError);
        assert_eq!(err.code.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
