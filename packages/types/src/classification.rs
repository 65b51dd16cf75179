use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::proto::ImageResponse;
use crate::timing::round2;
use crate::ToProto;

pub const MIN_CONFIDENCE: f64 = 0.55;
pub const MAX_CONFIDENCE: f64 = 0.99;

/// The fixed, ordered label set. The position of a label is its class index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Cat,
    Dog,
    Car,
    Airplane,
    Flower,
    Xray,
    Digit,
    Unknown,
}

impl Label {
    pub const ALL: [Label; 8] = [
        Label::Cat,
        Label::Dog,
        Label::Car,
        Label::Airplane,
        Label::Flower,
        Label::Xray,
        Label::Digit,
        Label::Unknown,
    ];

    /// Maps any index onto the label set by wrapping around.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "cat",
            Label::Dog => "dog",
            Label::Car => "car",
            Label::Airplane => "airplane",
            Label::Flower => "flower",
            Label::Xray => "xray",
            Label::Digit => "digit",
            Label::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// Outcome of one classification as seen by a caller of the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f64,
    pub model_latency_ms: u32,
}

impl ToProto<ImageResponse> for ClassificationResult {
    fn to_proto(&self) -> ImageResponse {
        ImageResponse {
            label: self.label.to_string(),
            confidence: self.confidence as f32,
            model_latency_ms: i32::try_from(self.model_latency_ms).unwrap_or(i32::MAX),
        }
    }
}

impl TryFrom<ImageResponse> for ClassificationResult {
    type Error = UnknownLabel;

    fn try_from(proto: ImageResponse) -> Result<Self, Self::Error> {
        Ok(ClassificationResult {
            label: proto.label.parse()?,
            // float on the wire; snap back to the two decimals the model produced
            confidence: round2(f64::from(proto.confidence)),
            model_latency_ms: u32::try_from(proto.model_latency_ms).unwrap_or(0),
        })
    }
}
