//! Component manifest: a shared Drive configuration plus named components
//!
//! ```yaml
//! configuration:
//!   credentials_file: "${GDRIVE_CREDENTIALS}"
//! components:
//!   upload-invoice:
//!     type: drive.file.upload
//!     fileName: "#[message.attributes().fileName]"
//! ```
//!
//! `${VAR}` references are resolved across the whole document before it is
//! deserialized. A component may carry its own `configuration`, whose keys
//! override the shared one.

use crate::error::{CliError, CliResult};
use crate::utils::validate_file_exists;
use gdrive_connectors::{ComponentFactory, ComponentKind, DriveConfiguration, Processor};
use gdrive_core::EnvResolver;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub configuration: Map<String, JsonValue>,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub configuration: Option<Map<String, JsonValue>>,
    /// Component properties, camelCase keys
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl Manifest {
    /// Load a manifest file; `.yaml`/`.yml` as YAML, `.json` as JSON, anything else tries both
    pub fn load(path: &Path) -> CliResult<Self> {
        validate_file_exists(path)?;
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let document: JsonValue = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(_) => serde_yaml::from_str(&content)?,
            },
        };
        debug!(path = %path.display(), "loaded manifest");
        Self::from_value(document)
    }

    pub fn from_value(document: JsonValue) -> CliResult<Self> {
        let resolved = EnvResolver::unrestricted().resolve(&document)?;
        serde_json::from_value(resolved)
            .map_err(|e| CliError::Manifest(format!("invalid manifest: {}", e)))
    }

    pub fn component(&self, name: &str) -> CliResult<&ComponentEntry> {
        self.components
            .get(name)
            .ok_or_else(|| CliError::ComponentNotFound(name.to_string()))
    }

    /// Shared configuration with the component's own keys layered on top
    pub fn configuration_for(&self, name: &str) -> CliResult<DriveConfiguration> {
        let entry = self.component(name)?;
        let mut merged = self.configuration.clone();
        if let Some(own) = &entry.configuration {
            for (key, value) in own {
                merged.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(JsonValue::Object(merged)).map_err(|e| {
            CliError::Manifest(format!("invalid configuration for '{}': {}", name, e))
        })
    }

    pub fn build(&self, name: &str) -> CliResult<Box<dyn Processor>> {
        let entry = self.component(name)?;
        let kind: ComponentKind = entry.kind.parse()?;
        let configuration = self.configuration_for(name)?;
        let component = ComponentFactory::new().build(
            kind,
            configuration,
            JsonValue::Object(entry.properties.clone()),
        )?;
        Ok(component)
    }
}
