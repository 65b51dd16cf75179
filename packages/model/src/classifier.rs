//! Deterministic stand-in for an image model.
//!
//! The label and confidence are derived from the SHA-256 digest of the raw
//! bytes, so identical input always yields identical output.

use sha2::{Digest, Sha256};
use wirebench_types::classification::MIN_CONFIDENCE;
use wirebench_types::timing::round2;
use wirebench_types::Label;

const CONFIDENCE_SPAN: f64 = 0.44;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: Label,
    pub confidence: f64,
}

pub fn classify(image: &[u8]) -> Classification {
    let digest = Sha256::digest(image);
    let label = Label::from_index(digest[0] as usize);
    let confidence = round2(MIN_CONFIDENCE + (f64::from(digest[1]) / 255.0) * CONFIDENCE_SPAN);
    Classification { label, confidence }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wirebench_types::classification::MAX_CONFIDENCE;

    #[test]
    fn test_classify_is_deterministic() {
        let image: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        assert_eq!(classify(&image), classify(&image.clone()));
    }

    #[test]
    fn test_known_digest() {
        // sha256("") = e3b0c442...; 0xe3 % 8 = 3, 0xb0 = 176
        let out = classify(b"");
        assert_eq!(out.label, Label::Airplane);
        assert_eq!(out.confidence, round2(0.55 + (176.0 / 255.0) * 0.44));
        assert_eq!(out.confidence, 0.85);
    }

    #[test]
    fn test_confidence_stays_in_range() {
        for seed in 0u16..2048 {
            let bytes = seed.to_le_bytes();
            let out = classify(&bytes);
            assert!(
                (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&out.confidence),
                "confidence {} out of range for seed {}",
                out.confidence,
                seed
            );
            assert!(Label::ALL.contains(&out.label));
        }
    }

    #[test]
    fn test_different_inputs_spread_over_labels() {
        let seen: std::collections::HashSet<_> = (0u16..512)
            .map(|seed| classify(&seed.to_be_bytes()).label)
            .collect();
        assert_eq!(seen.len(), Label::ALL.len());
    }
}
