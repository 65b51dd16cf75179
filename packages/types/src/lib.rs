//! Shared contract for the wirebench services.
//!
//! Everything that has to agree byte-for-byte between the model service, the
//! gateway and the benchmark harness lives here: the protobuf messages and
//! generated gRPC stubs, the schema descriptor, the batched-RPC envelope,
//! the label set and the wire-size helpers.

pub mod classification;
pub mod envelope;
pub mod proto;
pub mod schema;
pub mod timing;
pub mod wire;

pub use base64;
pub use prost;
pub use tonic;

pub use classification::{ClassificationResult, Label, UnknownLabel};
pub use envelope::Envelope;

/// Conversion from a domain type into its wire message.
pub trait ToProto<T> {
    fn to_proto(&self) -> T;
}

/// Upper bound for a single gRPC message in either direction.
pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Filename reported to the model when a caller did not supply one.
pub const UNKNOWN_FILENAME: &str = "unknown";

/// Prefixes `http://` when `addr` is a bare `host:port`, as gRPC channels need a URI.
pub fn grpc_endpoint(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else {
        format!("http://{}", addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grpc_endpoint() {
        assert_eq!(grpc_endpoint("127.0.0.1:50051"), "http://127.0.0.1:50051");
        assert_eq!(grpc_endpoint("http://model:50051"), "http://model:50051");
    }
}
