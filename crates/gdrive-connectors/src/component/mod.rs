//! Drive components: configured processors applied to one message at a time

mod file;
mod folder;
mod permission;

pub use file::{
    FileCreate, FileCreateConfig, FileDelete, FileDeleteConfig, FileDownload, FileDownloadConfig,
    FileList, FileListConfig, FileRead, FileReadConfig, FileUpdate, FileUpdateConfig,
    FileUpdateMetadata, FileUpdateMetadataConfig, FileUpload, FileUploadConfig,
};
pub use folder::{FolderCreate, FolderCreateConfig};
pub use permission::{
    PermissionCreate, PermissionCreateConfig, PermissionDelete, PermissionDeleteConfig,
    PermissionList, PermissionListConfig, PermissionUpdate, PermissionUpdateConfig,
};

use crate::config::DriveConfiguration;
use crate::error::{ConnectorError, ConnectorResult, DriveOperation};
use async_trait::async_trait;
use gdrive_core::{
    converter, Attributes, DynamicValue, FlowContext, Message, MessageBuilder, MimeType,
};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// A built component ready to process messages
#[async_trait]
pub trait Processor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn apply(&self, context: &FlowContext, message: Message) -> ConnectorResult<Message>;
}

/// Component type names as they appear in manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    FileCreate,
    FileUpload,
    FolderCreate,
    FileList,
    FileRead,
    FileDownload,
    FileUpdate,
    FileUpdateMetadata,
    FileDelete,
    PermissionCreate,
    PermissionList,
    PermissionUpdate,
    PermissionDelete,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 13] = [
        ComponentKind::FileCreate,
        ComponentKind::FileUpload,
        ComponentKind::FolderCreate,
        ComponentKind::FileList,
        ComponentKind::FileRead,
        ComponentKind::FileDownload,
        ComponentKind::FileUpdate,
        ComponentKind::FileUpdateMetadata,
        ComponentKind::FileDelete,
        ComponentKind::PermissionCreate,
        ComponentKind::PermissionList,
        ComponentKind::PermissionUpdate,
        ComponentKind::PermissionDelete,
    ];

    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKind::FileCreate => "drive.file.create",
            ComponentKind::FileUpload => "drive.file.upload",
            ComponentKind::FolderCreate => "drive.folder.create",
            ComponentKind::FileList => "drive.file.list",
            ComponentKind::FileRead => "drive.file.read",
            ComponentKind::FileDownload => "drive.file.download",
            ComponentKind::FileUpdate => "drive.file.update",
            ComponentKind::FileUpdateMetadata => "drive.file.update-metadata",
            ComponentKind::FileDelete => "drive.file.delete",
            ComponentKind::PermissionCreate => "drive.permission.create",
            ComponentKind::PermissionList => "drive.permission.list",
            ComponentKind::PermissionUpdate => "drive.permission.update",
            ComponentKind::PermissionDelete => "drive.permission.delete",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ComponentKind::FileCreate => "Create a file from the message payload",
            ComponentKind::FileUpload => {
                "Upload the message payload as a file, optionally into a folder"
            }
            ComponentKind::FolderCreate => "Create a folder",
            ComponentKind::FileList => "List or search files, one page at a time",
            ComponentKind::FileRead => "Read the content of a file",
            ComponentKind::FileDownload => "Download the content of a file",
            ComponentKind::FileUpdate => "Replace the content of a file with the message payload",
            ComponentKind::FileUpdateMetadata => "Rename a file or change its description",
            ComponentKind::FileDelete => "Delete a file",
            ComponentKind::PermissionCreate => "Share a file with a user, group, domain or anyone",
            ComponentKind::PermissionList => "List the permissions of a file",
            ComponentKind::PermissionUpdate => "Change the role of a permission",
            ComponentKind::PermissionDelete => "Remove a permission from a file",
        }
    }

    pub fn operation(&self) -> DriveOperation {
        match self {
            ComponentKind::FileCreate => DriveOperation::FileCreate,
            ComponentKind::FileUpload => DriveOperation::FileUpload,
            ComponentKind::FolderCreate => DriveOperation::FolderCreate,
            ComponentKind::FileList => DriveOperation::FileList,
            ComponentKind::FileRead => DriveOperation::FileRead,
            ComponentKind::FileDownload => DriveOperation::FileDownload,
            ComponentKind::FileUpdate => DriveOperation::FileUpdate,
            ComponentKind::FileUpdateMetadata => DriveOperation::FileUpdateMetadata,
            ComponentKind::FileDelete => DriveOperation::FileDelete,
            ComponentKind::PermissionCreate => DriveOperation::PermissionCreate,
            ComponentKind::PermissionList => DriveOperation::PermissionList,
            ComponentKind::PermissionUpdate => DriveOperation::PermissionUpdate,
            ComponentKind::PermissionDelete => DriveOperation::PermissionDelete,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ComponentKind {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentKind::ALL
            .iter()
            .find(|k| k.type_name() == s)
            .copied()
            .ok_or_else(|| ConnectorError::InvalidConfig(format!("Unknown component type: {}", s)))
    }
}

/// Builds components from a kind, a configuration and raw JSON properties
#[derive(Debug, Default)]
pub struct ComponentFactory;

impl ComponentFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        kind: ComponentKind,
        configuration: DriveConfiguration,
        properties: JsonValue,
    ) -> ConnectorResult<Box<dyn Processor>> {
        let component: Box<dyn Processor> = match kind {
            ComponentKind::FileCreate => {
                Box::new(FileCreate::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileUpload => {
                Box::new(FileUpload::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FolderCreate => {
                Box::new(FolderCreate::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileList => {
                Box::new(FileList::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileRead => {
                Box::new(FileRead::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileDownload => {
                Box::new(FileDownload::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileUpdate => {
                Box::new(FileUpdate::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileUpdateMetadata => {
                Box::new(FileUpdateMetadata::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::FileDelete => {
                Box::new(FileDelete::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::PermissionCreate => {
                Box::new(PermissionCreate::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::PermissionList => {
                Box::new(PermissionList::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::PermissionUpdate => {
                Box::new(PermissionUpdate::new(configuration, parse(kind, properties)?)?)
            }
            ComponentKind::PermissionDelete => {
                Box::new(PermissionDelete::new(configuration, parse(kind, properties)?)?)
            }
        };
        tracing::info!(component = component.name(), kind = %kind, "built Drive component");
        Ok(component)
    }
}

fn parse<T: DeserializeOwned>(kind: ComponentKind, properties: JsonValue) -> ConnectorResult<T> {
    let properties = match properties {
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(properties).map_err(|e| {
        ConnectorError::InvalidConfig(format!("Invalid {} properties: {}", kind, e))
    })
}

/// Reject scripts that do not parse before the component is used
pub(crate) fn validate_scripts(
    operation: DriveOperation,
    values: &[(&str, &DynamicValue)],
) -> ConnectorResult<()> {
    for (name, value) in values {
        value
            .validate()
            .map_err(|e| ConnectorError::config(operation, format!("{}: {}", name, e)))?;
    }
    Ok(())
}

pub(crate) fn require_configured(
    operation: DriveOperation,
    label: &str,
    value: &DynamicValue,
) -> ConnectorResult<()> {
    if value.is_null_or_blank() {
        return Err(ConnectorError::config(
            operation,
            format!("{} must not be empty.", label),
        ));
    }
    Ok(())
}

/// Evaluate an optional dynamic value; blank results count as unset
pub(crate) fn evaluate(
    value: &DynamicValue,
    context: &FlowContext,
    message: &Message,
) -> ConnectorResult<Option<String>> {
    Ok(value
        .evaluate(context, message)?
        .filter(|v| !v.trim().is_empty()))
}

pub(crate) fn evaluate_required(
    operation: DriveOperation,
    label: &str,
    value: &DynamicValue,
    context: &FlowContext,
    message: &Message,
) -> ConnectorResult<String> {
    evaluate(value, context, message)?.ok_or_else(|| {
        ConnectorError::operation(
            operation,
            format!("The {} must not be null (DynamicValue=[{}]).", label, value),
        )
    })
}

/// Evaluate an identifier, taking it from the payload when the property is blank
pub(crate) fn identifier(
    operation: DriveOperation,
    label: &str,
    value: &DynamicValue,
    context: &FlowContext,
    message: &Message,
) -> ConnectorResult<String> {
    let id = if !value.is_null_or_blank() {
        evaluate_required(operation, label, value, context, message)?
    } else {
        converter::require_text_or_binary(operation.as_str(), message.payload()).map_err(|e| {
            ConnectorError::operation(
                operation,
                format!("The payload type is not supported: {}", e),
            )
        })?;
        converter::to_text(message.payload()).map_err(|e| {
            ConnectorError::operation(
                operation,
                format!("The {} could not be read from the payload: {}", label, e),
            )
        })?
    };
    Ok(id.trim().to_string())
}

/// Outbound message carrying a single identifier as text
pub(crate) fn id_message(
    operation: DriveOperation,
    id: Option<String>,
    attributes: Attributes,
) -> Message {
    let builder = MessageBuilder::get(operation.as_str());
    let builder = match id {
        Some(id) => builder.with_text(id, MimeType::text_plain()),
        None => builder.empty(),
    };
    builder.attributes(attributes).build()
}
