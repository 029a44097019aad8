//! Payload conversion to the shapes Drive operations consume

use crate::error::{CoreError, CoreResult};
use crate::message::Payload;
use serde_json::Value as JsonValue;

/// Convert a payload into raw bytes
pub fn to_bytes(payload: &Payload) -> CoreResult<Vec<u8>> {
    match payload {
        Payload::Empty => Ok(Vec::new()),
        Payload::Text(text) => Ok(text.as_bytes().to_vec()),
        Payload::Binary(bytes) => Ok(bytes.clone()),
        Payload::Json(JsonValue::String(s)) => Ok(s.as_bytes().to_vec()),
        Payload::Json(value) => Ok(serde_json::to_vec(value)?),
    }
}

/// Convert a payload into text. Binary payloads must be valid UTF-8.
pub fn to_text(payload: &Payload) -> CoreResult<String> {
    match payload {
        Payload::Empty => Ok(String::new()),
        Payload::Text(text) => Ok(text.clone()),
        Payload::Binary(bytes) => String::from_utf8(bytes.clone()).map_err(|e| {
            CoreError::Conversion(format!("binary payload is not valid UTF-8: {}", e))
        }),
        Payload::Json(JsonValue::String(s)) => Ok(s.clone()),
        Payload::Json(value) => Ok(value.to_string()),
    }
}

/// Reject payloads which cannot carry an identifier
pub fn require_text_or_binary(component: &str, payload: &Payload) -> CoreResult<()> {
    match payload {
        Payload::Text(_) | Payload::Binary(_) => Ok(()),
        other => Err(CoreError::InvalidInput(format!(
            "component '{}' expects a text or binary payload, got {}",
            component,
            other.type_name()
        ))),
    }
}
