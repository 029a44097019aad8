//! Message model passed in and out of components

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Content type of a message payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeType(String);

impl MimeType {
    pub const TEXT_PLAIN: &'static str = "text/plain";
    pub const APPLICATION_BINARY: &'static str = "application/octet-stream";
    pub const APPLICATION_JSON: &'static str = "application/json";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn text_plain() -> Self {
        Self::new(Self::TEXT_PLAIN)
    }

    pub fn application_binary() -> Self {
        Self::new(Self::APPLICATION_BINARY)
    }

    pub fn application_json() -> Self {
        Self::new(Self::APPLICATION_JSON)
    }

    /// Parse a mime type, falling back to `default` for blank or malformed input.
    ///
    /// Type and subtype are lowercased; parameters are kept as given.
    pub fn parse(value: Option<&str>, default: &str) -> Self {
        match value.map(str::trim) {
            Some(v) if Self::is_well_formed(v) => match v.split_once(';') {
                Some((essence, params)) => {
                    Self::new(format!("{};{}", essence.trim().to_ascii_lowercase(), params))
                }
                None => Self::new(v.to_ascii_lowercase()),
            },
            _ => Self::new(default),
        }
    }

    fn is_well_formed(value: &str) -> bool {
        let essence = value.split(';').next().unwrap_or_default().trim();
        let mut parts = essence.split('/');
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(top), Some(sub), None) if !top.is_empty() && !sub.is_empty()
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MimeType {
    fn default() -> Self {
        Self::application_binary()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Message payload
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Text(String),
    Binary(Vec<u8>),
    Json(JsonValue),
}

impl Payload {
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Text(_) => "text",
            Payload::Binary(_) => "binary",
            Payload::Json(_) => "json",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

/// Flat string-keyed attribute bag attached to a message
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, JsonValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. `None` is kept as an explicit null.
    pub fn put<V: Into<JsonValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        let value = value.map(Into::into).unwrap_or(JsonValue::Null);
        self.0.insert(key.into(), value);
    }

    pub fn with<V: Into<JsonValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.put(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// String view of an attribute; null and missing are both `None`
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl FromIterator<(String, JsonValue)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (String, JsonValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A message flowing between components
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Message {
    component: Option<String>,
    mime_type: MimeType,
    payload: Payload,
    attributes: Attributes,
}

impl Message {
    /// Inbound text message
    pub fn text(text: impl Into<String>) -> Self {
        MessageBuilder::new()
            .with_text(text, MimeType::text_plain())
            .build()
    }

    /// Inbound binary message
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        MessageBuilder::new()
            .with_binary(bytes, MimeType::application_binary())
            .build()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    /// Name of the component which produced this message, if any
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }
}

/// Builder for outbound messages
#[derive(Debug, Default)]
pub struct MessageBuilder {
    component: Option<String>,
    mime_type: MimeType,
    payload: Payload,
    attributes: Attributes,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a message produced by the given component
    pub fn get(component: impl Into<String>) -> Self {
        Self {
            component: Some(component.into()),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>, mime_type: MimeType) -> Self {
        self.payload = Payload::Text(text.into());
        self.mime_type = mime_type;
        self
    }

    pub fn with_binary(mut self, bytes: impl Into<Vec<u8>>, mime_type: MimeType) -> Self {
        self.payload = Payload::Binary(bytes.into());
        self.mime_type = mime_type;
        self
    }

    pub fn with_json(mut self, value: JsonValue) -> Self {
        self.payload = Payload::Json(value);
        self.mime_type = MimeType::application_json();
        self
    }

    pub fn empty(mut self) -> Self {
        self.payload = Payload::Empty;
        self
    }

    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn build(self) -> Message {
        Message {
            component: self.component,
            mime_type: self.mime_type,
            payload: self.payload,
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mime_type_parse_falls_back_on_blank_or_malformed() {
        assert_eq!(MimeType::parse(None, MimeType::TEXT_PLAIN).as_str(), "text/plain");
        assert_eq!(MimeType::parse(Some("  "), MimeType::TEXT_PLAIN).as_str(), "text/plain");
        assert_eq!(
            MimeType::parse(Some("nonsense"), MimeType::APPLICATION_BINARY).as_str(),
            "application/octet-stream"
        );
        assert_eq!(
            MimeType::parse(Some("Image/JPEG"), MimeType::APPLICATION_BINARY).as_str(),
            "image/jpeg"
        );
        assert_eq!(
            MimeType::parse(Some("text/csv; charset=utf-8"), MimeType::TEXT_PLAIN).as_str(),
            "text/csv; charset=utf-8"
        );
    }

    #[test]
    fn mime_type_parse_keeps_parameter_case() {
        assert_eq!(
            MimeType::parse(Some("Text/HTML; charset=UTF-8"), MimeType::TEXT_PLAIN).as_str(),
            "text/html; charset=UTF-8"
        );
        assert_eq!(
            MimeType::parse(Some("multipart/related; boundary=AbC"), MimeType::TEXT_PLAIN)
                .as_str(),
            "multipart/related; boundary=AbC"
        );
    }

    #[test]
    fn attributes_keep_nulls_in_insertion_order() {
        let attrs = Attributes::new()
            .with("id", Some("abc"))
            .with::<String>("webViewLink", None)
            .with("ownedByMe", Some(true));

        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs.get_str("id"), Some("abc"));
        assert_eq!(attrs.get("webViewLink"), Some(&JsonValue::Null));
        assert_eq!(attrs.get_str("webViewLink"), None);
        let keys: Vec<_> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["id", "webViewLink", "ownedByMe"]);
        assert_eq!(
            attrs.to_json(),
            json!({"id": "abc", "webViewLink": null, "ownedByMe": true})
        );
    }

    #[test]
    fn builder_records_component_and_mime() {
        let message = MessageBuilder::get("FileUpload")
            .with_text("file-id", MimeType::text_plain())
            .attributes(Attributes::new().with("id", Some("file-id")))
            .build();

        assert_eq!(message.component(), Some("FileUpload"));
        assert_eq!(message.mime_type().as_str(), "text/plain");
        assert_eq!(message.payload(), &Payload::Text("file-id".to_string()));
        assert_eq!(message.attributes().get_str("id"), Some("file-id"));
    }

    #[test]
    fn json_payload_sets_json_mime() {
        let message = MessageBuilder::new().with_json(json!([1, 2])).build();
        assert_eq!(message.mime_type().as_str(), MimeType::APPLICATION_JSON);
    }
}
