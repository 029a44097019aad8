//! Command abstraction over Drive operations
//!
//! Each command holds the already-evaluated parameters of one Drive call. The
//! executor runs it against the shared client and maps the single client error
//! type through the command's own `on_error` into the operation's error.

mod file;
mod folder;
mod permission;

pub use file::{
    FileCreateCommand, FileDeleteCommand, FileDownloadCommand, FileListCommand, FileReadCommand,
    FileUpdateCommand, FileUpdateMetadataCommand, FileUploadCommand,
};
pub use folder::FolderCreateCommand;
pub use permission::{
    PermissionCreateCommand, PermissionDeleteCommand, PermissionListCommand,
    PermissionUpdateCommand, DOMAIN_REQUIRED, EMAIL_REQUIRED,
};

use crate::client::DriveClient;
use crate::config::DriveConfiguration;
use crate::error::{ClientError, ClientResult, ConnectorError, ConnectorResult, DriveOperation};
use async_trait::async_trait;
use std::fmt::Display;

#[async_trait]
pub trait Command: Send + Sync {
    type Output: Send;

    fn operation(&self) -> DriveOperation;

    async fn execute(&self, client: &DriveClient) -> ClientResult<Self::Output>;

    fn on_error(&self, error: ClientError) -> ConnectorError;
}

/// Executes commands against one Drive client
#[derive(Debug, Clone)]
pub struct DriveApi {
    client: DriveClient,
}

impl DriveApi {
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    pub async fn execute<C: Command>(&self, command: &C) -> ConnectorResult<C::Output> {
        tracing::debug!(command = %command.operation(), "executing Drive command");
        command.execute(&self.client).await.map_err(|error| {
            let mapped = command.on_error(error);
            tracing::warn!(command = %command.operation(), error = %mapped, "Drive command failed");
            mapped
        })
    }
}

pub struct DriveApiFactory;

impl DriveApiFactory {
    /// Create the API handle for a component from its configuration
    pub fn create(
        component: &str,
        configuration: &DriveConfiguration,
    ) -> ConnectorResult<DriveApi> {
        let client = DriveClient::from_configuration(configuration).map_err(|e| match e {
            ConnectorError::InvalidConfig(msg) => {
                ConnectorError::InvalidConfig(format!("{}: {}", component, msg))
            }
            ConnectorError::Authentication(msg) => {
                ConnectorError::Authentication(format!("{}: {}", component, msg))
            }
            other => other,
        })?;
        Ok(DriveApi::new(client))
    }
}

/// Render an optional parameter the way error messages show it
pub(crate) fn show<T: Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

/// `Could not <action> with configuration k=[v], ..., cause=[...].`
pub(crate) fn describe(action: &str, params: &[(&str, String)], cause: &str) -> String {
    let mut message = format!("Could not {}", action);
    if !params.is_empty() {
        let rendered = params
            .iter()
            .map(|(k, v)| format!("{}=[{}]", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        message.push_str(" with configuration ");
        message.push_str(&rendered);
        message.push(',');
    }
    message.push_str(&format!(" cause=[{}].", cause));
    message
}

pub(crate) fn failure(
    operation: DriveOperation,
    error: &ClientError,
    message: String,
) -> ConnectorError {
    ConnectorError::Operation {
        operation,
        message,
        status: error.status(),
    }
}

pub(crate) fn require_not_blank(
    operation: DriveOperation,
    label: &str,
    value: &str,
) -> ConnectorResult<()> {
    if value.trim().is_empty() {
        return Err(ConnectorError::operation(
            operation,
            format!("The {} must not be empty ({}).", label, operation),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_formats_parameters() {
        assert_eq!(
            describe(
                "delete file from Google Drive",
                &[("fileId", "abc".to_string())],
                "Not Found"
            ),
            "Could not delete file from Google Drive with configuration fileId=[abc], cause=[Not Found]."
        );
        assert_eq!(describe("do it", &[], "boom"), "Could not do it cause=[boom].");
        assert_eq!(show::<String>(&None), "null");
    }

    #[test]
    fn blank_identifiers_rejected() {
        let err = require_not_blank(DriveOperation::FileDelete, "File ID", "  ").unwrap_err();
        assert_eq!(err.drive_operation(), Some(DriveOperation::FileDelete));
        assert_eq!(err.to_string(), "The File ID must not be empty (FileDelete).");
        assert!(require_not_blank(DriveOperation::FileDelete, "File ID", "abc").is_ok());
    }
}
