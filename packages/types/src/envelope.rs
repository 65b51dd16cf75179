//! Type-preserving JSON envelope used by the batched-RPC surface.
//!
//! A value travels as `{"json": <plain projection>, "meta": {"values": {...}}}`
//! where `meta.values` maps a dotted path inside `json` to the original type
//! of the value found there. This lets numbers that do not fit a double,
//! `undefined` and dates survive the trip without being coerced.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Value>,
}

impl Envelope {
    /// Wraps a serializable value. Plain serde values need no annotations.
    pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Envelope {
            json: serde_json::to_value(value)?,
            meta: None,
        })
    }

    /// Restores annotated values and deserializes the result.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.into_value())
    }

    /// The plain JSON value with every annotation applied.
    pub fn into_value(self) -> Value {
        let mut json = self.json;
        if let Some(meta) = self.meta {
            for (path, annotation) in meta.values {
                let Some(kind) = annotation_kind(&annotation) else {
                    continue;
                };
                let segments: Vec<&str> = path.split('.').collect();
                apply(&mut json, &segments, kind);
            }
        }
        json
    }
}

// ["Date"] or "Date"
fn annotation_kind(annotation: &Value) -> Option<&str> {
    match annotation {
        Value::String(kind) => Some(kind),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

fn apply(value: &mut Value, segments: &[&str], kind: &str) {
    match segments {
        [] => {}
        [last] => match value {
            Value::Object(map) => restore_in_object(map, last, kind),
            Value::Array(items) => {
                if let Some(item) = last.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    restore(item, kind);
                }
            }
            _ => {}
        },
        [head, rest @ ..] => {
            let next = match value {
                Value::Object(map) => map.get_mut(*head),
                Value::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
                _ => None,
            };
            if let Some(next) = next {
                apply(next, rest, kind);
            }
        }
    }
}

fn restore_in_object(map: &mut Map<String, Value>, key: &str, kind: &str) {
    if kind == "undefined" {
        map.remove(key);
    } else if let Some(item) = map.get_mut(key) {
        restore(item, kind);
    }
}

fn restore(value: &mut Value, kind: &str) {
    match kind {
        "bigint" => {
            if let Some(number) = value
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .map(Value::from)
            {
                *value = number;
            }
        }
        // NaN and the infinities have no JSON form
        "number" => *value = Value::Null,
        "undefined" => *value = Value::Null,
        // dates, regexps and the like stay in their string form
        _ => {}
    }
}
