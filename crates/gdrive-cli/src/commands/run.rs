//! Apply one manifest component to a message built from the command line

use crate::cli::OutputFormat;
use crate::error::CliResult;
use crate::manifest::Manifest;
use crate::utils::{parse_key_value, validate_file_exists, write_output_data, ColoredOutput};
use anyhow::Context;
use gdrive_core::{FlowContext, Message, MessageBuilder, MimeType, Payload};
use serde_json::{json, Value as JsonValue};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything `gdrive run` needs besides the manifest
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub component: String,
    pub payload: Option<String>,
    pub payload_file: Option<PathBuf>,
    pub mime_type: Option<String>,
    pub attributes: Vec<String>,
    pub variables: Vec<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

pub struct RunCommand;

impl RunCommand {
    pub async fn run(manifest_path: &Path, request: RunRequest) -> CliResult<()> {
        let manifest = Manifest::load(manifest_path)?;
        let component = manifest.build(&request.component)?;

        let message = Self::inbound_message(&request)?;
        let context = Self::flow_context(&request.variables)?;

        info!(component = %request.component, "applying component");
        let result = component.apply(&context, message).await?;

        let rendered = Self::render(&result, request.format)?;
        match &request.output {
            Some(path) => {
                write_output_data(path, &rendered)?;
                eprintln!(
                    "{} Output written to: {}",
                    ColoredOutput::success("✓"),
                    path.display()
                );
            }
            None => {
                use std::io::Write;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&rendered)?;
                if request.format != OutputFormat::Raw {
                    stdout.write_all(b"\n")?;
                }
            }
        }
        Ok(())
    }

    /// Text payloads default to `text/plain`, file payloads to `application/octet-stream`
    pub fn inbound_message(request: &RunRequest) -> CliResult<Message> {
        let mime = request.mime_type.as_deref();
        let mut message = match (&request.payload, &request.payload_file) {
            (Some(text), _) => MessageBuilder::new()
                .with_text(text.clone(), MimeType::parse(mime, MimeType::TEXT_PLAIN))
                .build(),
            (None, Some(path)) => {
                validate_file_exists(path)?;
                let bytes = std::fs::read(path)
                    .with_context(|| format!("reading payload file {}", path.display()))?;
                MessageBuilder::new()
                    .with_binary(bytes, MimeType::parse(mime, MimeType::APPLICATION_BINARY))
                    .build()
            }
            (None, None) => Message::empty(),
        };

        for pair in &request.attributes {
            let (key, value) = parse_key_value(pair)?;
            message.attributes_mut().put(key, Some(value));
        }
        Ok(message)
    }

    pub fn flow_context(variables: &[String]) -> CliResult<FlowContext> {
        let mut context = FlowContext::new();
        for pair in variables {
            let (key, value) = parse_key_value(pair)?;
            context.set(key, value);
        }
        Ok(context)
    }

    /// Raw writes the payload as is; the JSON formats wrap payload, mime type and attributes
    pub fn render(message: &Message, format: OutputFormat) -> CliResult<Vec<u8>> {
        if format == OutputFormat::Raw {
            return Ok(match message.payload() {
                Payload::Empty => Vec::new(),
                Payload::Text(text) => text.as_bytes().to_vec(),
                Payload::Binary(bytes) => bytes.clone(),
                Payload::Json(value) => serde_json::to_vec_pretty(value)?,
            });
        }

        let document = json!({
            "payload": Self::payload_json(message.payload()),
            "mimeType": message.mime_type().as_str(),
            "attributes": message.attributes().to_json(),
        });
        let text = match format {
            OutputFormat::Json => serde_json::to_string(&document)?,
            _ => serde_json::to_string_pretty(&document)?,
        };
        Ok(text.into_bytes())
    }

    fn payload_json(payload: &Payload) -> JsonValue {
        match payload {
            Payload::Empty => JsonValue::Null,
            Payload::Text(text) => JsonValue::String(text.clone()),
            Payload::Json(value) => value.clone(),
            Payload::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => JsonValue::String(text.to_string()),
                // Use --format raw to get the bytes themselves
                Err(_) => json!({ "binary": bytes.len() }),
            },
        }
    }
}
