//! Named-event envelope and codecs for the realtime channel.
//!
//! An event is a name plus an arbitrary JSON payload. Two wire forms are
//! supported: compact protobuf for binary websocket messages, and the
//! `["name", payload]` JSON array used by text messages.

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error returned by the decoders in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The raw bytes could not be decoded as a protobuf `WireEvent`.
    #[error("failed to decode protobuf event: {0}")]
    Decode(#[from] prost::DecodeError),
    /// The text message is not valid JSON.
    #[error("failed to parse text event: {0}")]
    Json(#[from] serde_json::Error),
    /// The text message is JSON but not a `["name", payload]` array.
    #[error("malformed text event: {0}")]
    Malformed(&'static str),
    /// The event name is empty.
    #[error("event name is empty")]
    EmptyName,
}

/// A single named message on the realtime channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name, e.g. `"news"`.
    pub name: String,
    /// Arbitrary JSON payload. `Null` when the sender attached none.
    pub data: Value,
}

impl Event {
    /// Build an event from a name and payload.
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self { name: name.into(), data }
    }
}

/// Encode an event into protobuf bytes.
#[must_use]
pub fn encode_event(event: &Event) -> Vec<u8> {
    let wire = WireEvent {
        name: event.name.clone(),
        data: Some(json_to_proto_value(&event.data)),
    };

    let mut out = Vec::with_capacity(wire.encoded_len());
    // Encoding into a growable Vec cannot run out of buffer.
    wire.encode(&mut out).unwrap_or_default();
    out
}

/// Decode protobuf bytes into an event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed bytes and
/// [`CodecError::EmptyName`] when the decoded name is empty.
pub fn decode_event(bytes: &[u8]) -> Result<Event, CodecError> {
    let wire = WireEvent::decode(bytes)?;
    if wire.name.is_empty() {
        return Err(CodecError::EmptyName);
    }
    Ok(Event {
        name: wire.name,
        data: wire.data.map_or(Value::Null, |v| proto_to_json_value(&v)),
    })
}

/// Encode an event as a `["name", payload]` JSON text message. Clients only
/// send protobuf, so this exists for building text fixtures.
#[cfg(test)]
fn encode_text_event(event: &Event) -> String {
    Value::Array(vec![Value::String(event.name.clone()), event.data.clone()]).to_string()
}

/// Decode a `["name"]` or `["name", payload]` JSON text message.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for invalid JSON, [`CodecError::Malformed`]
/// when the shape is not a name-led array, and [`CodecError::EmptyName`] for
/// an empty name.
pub fn decode_text_event(text: &str) -> Result<Event, CodecError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(mut items) = value else {
        return Err(CodecError::Malformed("expected a JSON array"));
    };
    if items.is_empty() || items.len() > 2 {
        return Err(CodecError::Malformed("expected one or two elements"));
    }
    let data = if items.len() == 2 { items.pop().unwrap_or(Value::Null) } else { Value::Null };
    let Some(Value::String(name)) = items.pop() else {
        return Err(CodecError::Malformed("event name must be a string"));
    };
    if name.is_empty() {
        return Err(CodecError::EmptyName);
    }
    Ok(Event { name, data })
}

fn json_to_proto_value(value: &Value) -> prost_types::Value {
    let kind = match value {
        Value::Null => {
            prost_types::value::Kind::NullValue(prost_types::NullValue::NullValue as i32)
        }
        Value::Bool(v) => prost_types::value::Kind::BoolValue(*v),
        Value::Number(v) => prost_types::value::Kind::NumberValue(v.as_f64().unwrap_or(0.0)),
        Value::String(v) => prost_types::value::Kind::StringValue(v.clone()),
        Value::Array(v) => prost_types::value::Kind::ListValue(prost_types::ListValue {
            values: v.iter().map(json_to_proto_value).collect(),
        }),
        Value::Object(v) => prost_types::value::Kind::StructValue(prost_types::Struct {
            fields: v
                .iter()
                .map(|(k, v)| (k.clone(), json_to_proto_value(v)))
                .collect(),
        }),
    };

    prost_types::Value { kind: Some(kind) }
}

fn proto_to_json_value(value: &prost_types::Value) -> Value {
    let Some(kind) = &value.kind else {
        return Value::Null;
    };

    match kind {
        prost_types::value::Kind::NullValue(_) => Value::Null,
        prost_types::value::Kind::NumberValue(v) => {
            serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number)
        }
        prost_types::value::Kind::StringValue(v) => Value::String(v.clone()),
        prost_types::value::Kind::BoolValue(v) => Value::Bool(*v),
        prost_types::value::Kind::StructValue(v) => Value::Object(
            v.fields
                .iter()
                .map(|(k, v)| (k.clone(), proto_to_json_value(v)))
                .collect(),
        ),
        prost_types::value::Kind::ListValue(v) => {
            Value::Array(v.values.iter().map(proto_to_json_value).collect())
        }
    }
}

#[derive(Clone, PartialEq, Message)]
struct WireEvent {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(message, optional, tag = "2")]
    data: Option<prost_types::Value>,
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
