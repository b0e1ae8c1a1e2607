//! Tagged JSON encoding of store contents.
//!
//! The backing file is one JSON object keyed by store key. Each entry carries
//! its kind tag next to the payload:
//!
//! ```json
//! {
//!   "count": { "type": "INT32", "value": 3 },
//!   "name":  { "type": "STRING", "value": "puffer" },
//!   "ratio": { "type": "FLOAT64", "value": "NaN" }
//! }
//! ```
//!
//! Non-finite floats have no JSON number form and are written as the strings
//! `"NaN"`, `"Infinity"` and `"-Infinity"`. Entries with a missing or
//! unrecognised tag are skipped on decode and reported back to the caller; an
//! entry whose tag is known but whose payload does not fit it fails the whole
//! decode.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::snapshot::Snapshot;
use super::value::{Kind, Value};

pub const NAN: &str = "NaN";
pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed store file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Payload {payload} does not fit kind {kind}")]
    Payload { kind: Kind, payload: String },

    #[error("Entry '{key}': payload {payload} does not fit kind {kind}")]
    Entry {
        key: String,
        kind: Kind,
        payload: String,
    },
}

/// One entry as it appears in the backing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEntry {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl WireEntry {
    /// Split a raw entry into tag and payload.
    ///
    /// An entry without a string `type` has no kind to decode into; the error
    /// carries whatever stood in place of the tag, `null` when it was absent.
    fn from_json(raw: serde_json::Value) -> Result<Self, String> {
        use serde_json::Value as Json;

        let Json::Object(mut fields) = raw else {
            return Err(Json::Null.to_string());
        };
        match fields.remove("type") {
            Some(Json::String(tag)) => Ok(Self {
                tag,
                value: fields.remove("value").unwrap_or(Json::Null),
            }),
            Some(other) => Err(other.to_string()),
            None => Err(Json::Null.to_string()),
        }
    }
}

/// Result of decoding a whole file.
#[derive(Debug, Default)]
pub struct DecodedSnapshot {
    pub snapshot: Snapshot,
    /// `(key, tag)` pairs dropped because the tag is missing or not a known
    /// kind.
    pub skipped: Vec<(String, String)>,
}

pub fn encode(value: &Value) -> WireEntry {
    use serde_json::Value as Json;

    let payload = match value {
        Value::Int32(v) => Json::from(*v),
        Value::Int64(v) => Json::from(*v),
        Value::Float32(v) => encode_float(f64::from(*v)),
        Value::Float64(v) => encode_float(*v),
        Value::Bool(v) => Json::Bool(*v),
        Value::String(v) => Json::String(v.clone()),
    };

    WireEntry {
        tag: value.kind().tag().to_string(),
        value: payload,
    }
}

/// Decode a single entry. `Ok(None)` means the tag is not recognised.
pub fn decode(entry: &WireEntry) -> Result<Option<Value>, CodecError> {
    let Some(kind) = Kind::from_tag(&entry.tag) else {
        return Ok(None);
    };

    let payload = &entry.value;
    let mismatch = || CodecError::Payload {
        kind,
        payload: payload.to_string(),
    };

    let value = match kind {
        Kind::Int32 => payload
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int32),
        Kind::Int64 => payload.as_i64().map(Value::Int64),
        // Narrowing is exact for anything that was encoded from an f32.
        #[allow(clippy::cast_possible_truncation)]
        Kind::Float32 => decode_float(payload).map(|v| Value::Float32(v as f32)),
        Kind::Float64 => decode_float(payload).map(Value::Float64),
        Kind::Bool => payload.as_bool().map(Value::Bool),
        Kind::String => payload.as_str().map(|s| Value::String(s.to_owned())),
    };

    value.map(Some).ok_or_else(mismatch)
}

pub fn encode_snapshot(snapshot: &Snapshot, pretty: bool) -> Result<Vec<u8>, CodecError> {
    let wire: BTreeMap<&str, WireEntry> = snapshot
        .iter()
        .map(|(key, value)| (key.as_str(), encode(value)))
        .collect();

    let bytes = if pretty {
        serde_json::to_vec_pretty(&wire)?
    } else {
        serde_json::to_vec(&wire)?
    };
    Ok(bytes)
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<DecodedSnapshot, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(DecodedSnapshot::default());
    }

    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_slice(bytes)?;
    let mut decoded = DecodedSnapshot::default();

    for (key, raw_entry) in raw {
        let entry = match WireEntry::from_json(raw_entry) {
            Ok(entry) => entry,
            Err(tag) => {
                decoded.skipped.push((key, tag));
                continue;
            }
        };
        match decode(&entry) {
            Ok(Some(value)) => decoded.snapshot.insert(key, value),
            Ok(None) => decoded.skipped.push((key, entry.tag)),
            Err(CodecError::Payload { kind, payload }) => {
                return Err(CodecError::Entry { key, kind, payload });
            }
            Err(e) => return Err(e),
        }
    }

    Ok(decoded)
}

fn encode_float(v: f64) -> serde_json::Value {
    if v.is_nan() {
        serde_json::Value::String(NAN.to_string())
    } else if v == f64::INFINITY {
        serde_json::Value::String(INFINITY.to_string())
    } else if v == f64::NEG_INFINITY {
        serde_json::Value::String(NEG_INFINITY.to_string())
    } else {
        serde_json::Value::from(v)
    }
}

fn decode_float(payload: &serde_json::Value) -> Option<f64> {
    match payload {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => match s.as_str() {
            NAN => Some(f64::NAN),
            INFINITY => Some(f64::INFINITY),
            NEG_INFINITY => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}
