//! Dynamic values: configuration strings evaluated against the inbound message
//!
//! A value wrapped in `#[ ... ]` is a script, anything else is a literal. Scripts are a
//! `+`-separated list of terms:
//!
//! - `'text'` / `"text"` string literals, integers, `true`, `false`, `null`
//! - `message.payload()`, `message.mimeType()`, `message.attributes()`,
//!   `message.attributes().key`, `message.attributes()['key']`
//! - `context.key`, `context.variables.key`, `context.executionId`

use crate::context::FlowContext;
use crate::converter;
use crate::error::{CoreError, CoreResult};
use crate::message::{Message, Payload};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

static SCRIPT_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*#\[(.*)\]\s*$").expect("valid script regex"));

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*(?:(?P<str>'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*")|(?P<plus>\+)|(?P<num>-?\d+)|(?P<path>[A-Za-z_][A-Za-z0-9_]*(?:\(\))?(?:\.[A-Za-z_][A-Za-z0-9_]*(?:\(\))?|\[\s*(?:'[^']*'|"[^"]*")\s*\])*))"#,
    )
    .expect("valid token regex")
});

static SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:\.?(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<call>\(\))?|\[\s*(?:'(?P<sq>[^']*)'|"(?P<dq>[^"]*)")\s*\])"#,
    )
    .expect("valid segment regex")
});

/// A configuration value which may be a literal or a `#[...]` script
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicValue(Option<String>);

impl DynamicValue {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_script(&self) -> bool {
        self.0
            .as_deref()
            .map(|v| SCRIPT_MARKERS.is_match(v))
            .unwrap_or(false)
    }

    /// True when unset or when a literal made only of whitespace
    pub fn is_null_or_blank(&self) -> bool {
        match self.0.as_deref() {
            None => true,
            Some(v) => v.trim().is_empty(),
        }
    }

    /// Parse the script without evaluating it
    pub fn validate(&self) -> CoreResult<()> {
        self.script().map(|_| ())
    }

    fn script(&self) -> CoreResult<Option<Script>> {
        let Some(raw) = self.0.as_deref() else {
            return Ok(None);
        };
        match SCRIPT_MARKERS.captures(raw) {
            Some(caps) => Script::parse(&caps[1]).map(Some),
            None => Ok(None),
        }
    }

    pub fn evaluate(&self, context: &FlowContext, message: &Message) -> CoreResult<Option<String>> {
        match self.script()? {
            Some(script) => script.evaluate(context, message),
            None => Ok(self.0.clone()),
        }
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        Self(Some(value.to_string()))
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        Self(Some(value))
    }
}

impl From<Option<String>> for DynamicValue {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => f.write_str(v),
            None => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Term {
    Literal(JsonValue),
    Path(Vec<Segment>),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Property(String),
    Call(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Script {
    terms: Vec<Term>,
}

impl Script {
    fn parse(source: &str) -> CoreResult<Self> {
        let mut terms = Vec::new();
        let mut rest = source;
        let mut expect_term = true;

        while !rest.trim().is_empty() {
            let caps = TOKEN.captures(rest).ok_or_else(|| {
                CoreError::Expression(format!("unexpected input '{}' in '{}'", rest.trim(), source))
            })?;
            let consumed = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());

            if caps.name("plus").is_some() {
                if expect_term {
                    return Err(CoreError::Expression(format!("dangling '+' in '{}'", source)));
                }
                expect_term = true;
            } else {
                if !expect_term {
                    return Err(CoreError::Expression(format!(
                        "missing '+' between terms in '{}'",
                        source
                    )));
                }
                terms.push(Self::term(&caps, source)?);
                expect_term = false;
            }
            rest = &rest[consumed..];
        }

        if terms.is_empty() || expect_term {
            return Err(CoreError::Expression(format!("incomplete expression '{}'", source)));
        }
        Ok(Self { terms })
    }

    fn term(caps: &regex::Captures<'_>, source: &str) -> CoreResult<Term> {
        if let Some(s) = caps.name("str") {
            let quoted = s.as_str();
            return Ok(Term::Literal(JsonValue::String(unescape(
                &quoted[1..quoted.len() - 1],
            ))));
        }
        if let Some(n) = caps.name("num") {
            let value: i64 = n
                .as_str()
                .parse()
                .map_err(|e| CoreError::Expression(format!("invalid number: {}", e)))?;
            return Ok(Term::Literal(JsonValue::from(value)));
        }
        let path = caps
            .name("path")
            .map(|m| m.as_str())
            .ok_or_else(|| CoreError::Expression(format!("invalid term in '{}'", source)))?;
        match path {
            "true" => return Ok(Term::Literal(JsonValue::Bool(true))),
            "false" => return Ok(Term::Literal(JsonValue::Bool(false))),
            "null" => return Ok(Term::Literal(JsonValue::Null)),
            _ => {}
        }
        let segments = parse_segments(path)?;
        check_path(path, &segments)?;
        Ok(Term::Path(segments))
    }

    fn evaluate(&self, context: &FlowContext, message: &Message) -> CoreResult<Option<String>> {
        let mut rendered: Option<String> = None;
        for term in &self.terms {
            let value = match term {
                Term::Literal(v) => v.clone(),
                Term::Path(segments) => resolve(segments, context, message)?,
            };
            if let Some(text) = render(&value) {
                rendered.get_or_insert_with(String::new).push_str(&text);
            }
        }
        Ok(rendered)
    }
}

fn parse_segments(path: &str) -> CoreResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        let caps = SEGMENT
            .captures(rest)
            .ok_or_else(|| CoreError::Expression(format!("invalid path '{}'", path)))?;
        if let Some(name) = caps.name("name") {
            let name = name.as_str().to_string();
            if caps.name("call").is_some() {
                segments.push(Segment::Call(name));
            } else {
                segments.push(Segment::Property(name));
            }
        } else if let Some(key) = caps.name("sq").or_else(|| caps.name("dq")) {
            segments.push(Segment::Property(key.as_str().to_string()));
        }
        let consumed = caps.get(0).map(|m| m.end()).unwrap_or(rest.len());
        rest = &rest[consumed..];
    }
    Ok(segments)
}

fn check_path(path: &str, segments: &[Segment]) -> CoreResult<()> {
    let calls_after = |from: usize| {
        segments
            .iter()
            .skip(from)
            .any(|s| matches!(s, Segment::Call(_)))
    };
    match segments {
        [Segment::Property(root), Segment::Call(call), ..] if root == "message" => {
            if !matches!(call.as_str(), "payload" | "mimeType" | "attributes") {
                return Err(CoreError::Expression(format!(
                    "unknown message function '{}()' in '{}'",
                    call, path
                )));
            }
            if calls_after(2) {
                return Err(CoreError::Expression(format!("unsupported call in '{}'", path)));
            }
            Ok(())
        }
        [Segment::Property(root), ..] if root == "message" => Err(CoreError::Expression(
            format!(
                "'{}': message must be followed by payload(), mimeType() or attributes()",
                path
            ),
        )),
        [Segment::Property(root), ..] if root == "context" => {
            if calls_after(1) {
                return Err(CoreError::Expression(format!("unsupported call in '{}'", path)));
            }
            Ok(())
        }
        _ => Err(CoreError::Expression(format!(
            "unknown root in '{}': expected 'message' or 'context'",
            path
        ))),
    }
}

fn resolve(
    segments: &[Segment],
    context: &FlowContext,
    message: &Message,
) -> CoreResult<JsonValue> {
    let (root, tail) = match segments.split_first() {
        Some((Segment::Property(root), tail)) => (root.as_str(), tail),
        _ => return Err(CoreError::Expression("empty path".to_string())),
    };

    let (mut current, tail) = match root {
        "message" => match tail.split_first() {
            Some((Segment::Call(call), rest)) => (message_call(call, message)?, rest),
            Some((Segment::Property(p), _)) => {
                return Err(CoreError::Expression(format!(
                    "message.{} is not supported, use message.{}()",
                    p, p
                )))
            }
            None => {
                return Err(CoreError::Expression(
                    "message must be followed by payload(), mimeType() or attributes()".to_string(),
                ))
            }
        },
        "context" => match tail.split_first() {
            Some((Segment::Property(p), rest)) if p == "executionId" => {
                (JsonValue::String(context.execution_id.to_string()), rest)
            }
            Some((Segment::Property(p), rest)) if p == "variables" => {
                (JsonValue::Object(context.variables.clone()), rest)
            }
            _ => (JsonValue::Object(context.variables.clone()), tail),
        },
        other => return Err(CoreError::Expression(format!("unknown root '{}'", other))),
    };

    for segment in tail {
        current = match segment {
            Segment::Property(key) => current.get(key).cloned().unwrap_or(JsonValue::Null),
            Segment::Call(call) => {
                return Err(CoreError::Expression(format!("unsupported call '{}()'", call)))
            }
        };
    }
    Ok(current)
}

fn message_call(call: &str, message: &Message) -> CoreResult<JsonValue> {
    match call {
        "payload" => match message.payload() {
            Payload::Empty => Ok(JsonValue::Null),
            Payload::Json(value) => Ok(value.clone()),
            other => Ok(JsonValue::String(converter::to_text(other)?)),
        },
        "mimeType" => Ok(JsonValue::String(message.mime_type().to_string())),
        "attributes" => Ok(message.attributes().to_json()),
        other => Err(CoreError::Expression(format!("unknown message function '{}()'", other))),
    }
}

fn render(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Attributes, MessageBuilder, MimeType};
    use serde_json::json;

    fn message_with_attributes() -> Message {
        MessageBuilder::new()
            .with_text("payload-id", MimeType::text_plain())
            .attributes(
                Attributes::new()
                    .with("nextPageToken", Some("token-1"))
                    .with("file name", Some("report.pdf"))
                    .with::<String>("missing", None)
                    .with("count", Some(3)),
            )
            .build()
    }

    #[test]
    fn literal_evaluates_to_itself() {
        let ctx = FlowContext::new();
        let value = DynamicValue::from("my-drive");
        assert!(!value.is_script());
        assert_eq!(value.evaluate(&ctx, &Message::empty()).unwrap(), Some("my-drive".into()));
        assert_eq!(DynamicValue::none().evaluate(&ctx, &Message::empty()).unwrap(), None);
    }

    #[test]
    fn null_or_blank_detection() {
        assert!(DynamicValue::none().is_null_or_blank());
        assert!(DynamicValue::from("   ").is_null_or_blank());
        assert!(!DynamicValue::from("#[message.payload()]").is_null_or_blank());
    }

    #[test]
    fn attribute_access_both_forms() {
        let ctx = FlowContext::new();
        let msg = message_with_attributes();

        let dotted = DynamicValue::from("#[message.attributes().nextPageToken]");
        assert_eq!(dotted.evaluate(&ctx, &msg).unwrap(), Some("token-1".into()));

        let bracket = DynamicValue::from("#[message.attributes()['file name']]");
        assert_eq!(bracket.evaluate(&ctx, &msg).unwrap(), Some("report.pdf".into()));

        let number = DynamicValue::from("#[message.attributes().count]");
        assert_eq!(number.evaluate(&ctx, &msg).unwrap(), Some("3".into()));
    }

    #[test]
    fn missing_or_null_attribute_is_none() {
        let ctx = FlowContext::new();
        let msg = message_with_attributes();
        for expr in ["#[message.attributes().missing]", "#[message.attributes().absent]"] {
            assert_eq!(DynamicValue::from(expr).evaluate(&ctx, &msg).unwrap(), None);
        }
        // Default page token of the list component on a fresh message
        let fresh = DynamicValue::from("#[message.attributes().nextPageToken]");
        assert_eq!(fresh.evaluate(&ctx, &Message::text("x")).unwrap(), None);
    }

    #[test]
    fn concatenation_skips_nulls() {
        let ctx = FlowContext::new().with_variable("folder", "invoices");
        let msg = message_with_attributes();

        let value = DynamicValue::from(
            "#[context.folder + '/' + message.attributes().missing + message.payload() + \".txt\"]",
        );
        assert_eq!(
            value.evaluate(&ctx, &msg).unwrap(),
            Some("invoices/payload-id.txt".into())
        );

        let all_null = DynamicValue::from("#[message.attributes().missing + null]");
        assert_eq!(all_null.evaluate(&ctx, &msg).unwrap(), None);
    }

    #[test]
    fn context_access() {
        let ctx = FlowContext::new().with_variable("user", json!({"email": "a@b.c"}));
        let msg = Message::empty();

        let nested = DynamicValue::from("#[context.variables.user.email]");
        assert_eq!(nested.evaluate(&ctx, &msg).unwrap(), Some("a@b.c".into()));

        let id = DynamicValue::from("#[context.executionId]");
        assert_eq!(id.evaluate(&ctx, &msg).unwrap(), Some(ctx.execution_id.to_string()));
    }

    #[test]
    fn payload_of_binary_message_is_text() {
        let ctx = FlowContext::new();
        let msg = Message::binary(b"1f1Vx-AanOdkVEQ".to_vec());
        let value = DynamicValue::from("#[message.payload()]");
        assert_eq!(value.evaluate(&ctx, &msg).unwrap(), Some("1f1Vx-AanOdkVEQ".into()));
        assert_eq!(value.evaluate(&ctx, &Message::empty()).unwrap(), None);
    }

    #[test]
    fn string_literal_escapes() {
        let value = DynamicValue::from(r#"#['it\'s' + " \"quoted\""]"#);
        assert_eq!(
            value.evaluate(&FlowContext::new(), &Message::empty()).unwrap(),
            Some("it's \"quoted\"".into())
        );
    }

    #[test]
    fn invalid_scripts_are_rejected() {
        for expr in [
            "#[message.attributes(]",
            "#[foo.bar]",
            "#['a' +]",
            "#['a' 'b']",
            "#[message.body]",
            "#[]",
        ] {
            assert!(DynamicValue::from(expr).validate().is_err(), "{} should fail", expr);
        }
        assert!(DynamicValue::from("#[message.attributes().id]").validate().is_ok());
        assert!(DynamicValue::from("plain text").validate().is_ok());
    }
}
