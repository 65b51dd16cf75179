//! Message types of the `imageclassifier` package together with the
//! `ImageClassifier` client and server stubs, all generated from
//! `proto/image_classifier.proto`. Response messages also derive serde so
//! callers can render them as JSON without a second model.

include!(concat!(env!("OUT_DIR"), "/imageclassifier.rs"));

/// Encoded `FileDescriptorSet` of the contract the code above was generated from.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/imageclassifier_descriptor.bin"));

impl ImageResult {
    pub fn from_response(filename: impl Into<String>, response: ImageResponse) -> Self {
        Self {
            filename: filename.into(),
            label: response.label,
            confidence: response.confidence,
            model_latency_ms: response.model_latency_ms,
        }
    }
}
