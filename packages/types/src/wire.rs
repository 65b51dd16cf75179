//! Wire-exact payload sizes.
//!
//! Sizes are always obtained by encoding the message in its transmitted form,
//! never estimated from an in-memory structure.

use prost::Message;
use serde::Serialize;

use crate::proto::{ImageRequest, ImageResponse, ImageResult, ImagesRequest, ImagesResponse};

/// Byte length of `message` after protobuf encoding.
pub fn proto_size<M: Message>(message: &M) -> usize {
    message.encode_to_vec().len()
}

/// UTF-8 byte length of the compact JSON serialization of `value`.
pub fn json_size<T: Serialize + ?Sized>(value: &T) -> Result<usize, serde_json::Error> {
    Ok(serde_json::to_vec(value)?.len())
}

pub fn image_request_size(image_data: &[u8], filename: &str) -> usize {
    proto_size(&ImageRequest {
        image_data: image_data.to_vec(),
        filename: filename.to_string(),
    })
}

pub fn image_response_size(response: &ImageResponse) -> usize {
    proto_size(response)
}

pub fn images_request_size<'a>(images: impl IntoIterator<Item = (&'a [u8], &'a str)>) -> usize {
    proto_size(&ImagesRequest {
        images: images
            .into_iter()
            .map(|(image_data, filename)| ImageRequest {
                image_data: image_data.to_vec(),
                filename: filename.to_string(),
            })
            .collect(),
    })
}

pub fn images_response_size(results: &[ImageResult]) -> usize {
    proto_size(&ImagesResponse {
        results: results.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_size_matches_manual_layout() {
        // tag(1) + len(1) + 100 bytes, tag(1) + len(1) + "a.png"
        assert_eq!(image_request_size(&[7u8; 100], "a.png"), 2 + 100 + 2 + 5);
    }

    #[test]
    fn test_empty_message_encodes_to_zero_bytes() {
        assert_eq!(proto_size(&ImageResponse::default()), 0);
        assert_eq!(images_response_size(&[]), 0);
    }

    #[test]
    fn test_size_is_deterministic_and_matches_reencoding() {
        let response = ImageResponse {
            label: "flower".to_string(),
            confidence: 0.73,
            model_latency_ms: 24,
        };
        let first = image_response_size(&response);
        let decoded = ImageResponse::decode(response.encode_to_vec().as_slice()).unwrap();
        assert_eq!(first, image_response_size(&decoded));
        assert_eq!(first, image_response_size(&response));
    }

    #[test]
    fn test_batch_request_wraps_each_image() {
        let a = [1u8; 10];
        let b = [2u8; 20];
        let single_a = image_request_size(&a, "a");
        let single_b = image_request_size(&b, "b");
        let batch = images_request_size([(&a[..], "a"), (&b[..], "b")]);
        assert_eq!(batch, (1 + 1 + single_a) + (1 + 1 + single_b));
    }

    #[test]
    fn test_json_size_counts_utf8_bytes() {
        assert_eq!(json_size(&serde_json::json!({"a": "ü"})).unwrap(), 10);
    }
}
