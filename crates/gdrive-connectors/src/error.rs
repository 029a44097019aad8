use gdrive_core::CoreError;
use std::fmt;

/// Drive operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveOperation {
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

impl DriveOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriveOperation::FileCreate => "FileCreate",
            DriveOperation::FileUpload => "FileUpload",
            DriveOperation::FolderCreate => "FolderCreate",
            DriveOperation::FileList => "FileList",
            DriveOperation::FileRead => "FileRead",
            DriveOperation::FileDownload => "FileDownload",
            DriveOperation::FileUpdate => "FileUpdate",
            DriveOperation::FileUpdateMetadata => "FileUpdateMetadata",
            DriveOperation::FileDelete => "FileDelete",
            DriveOperation::PermissionCreate => "PermissionCreate",
            DriveOperation::PermissionList => "PermissionList",
            DriveOperation::PermissionUpdate => "PermissionUpdate",
            DriveOperation::PermissionDelete => "PermissionDelete",
        }
    }
}

impl fmt::Display for DriveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type produced by the Drive client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Drive API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Short cause used in operation error messages
    pub fn cause(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Failure of one Drive operation, carrying the operation's own message
    #[error("{message}")]
    Operation {
        operation: DriveOperation,
        message: String,
        status: Option<u16>,
    },
}

impl ConnectorError {
    pub fn operation(operation: DriveOperation, message: impl Into<String>) -> Self {
        ConnectorError::Operation {
            operation,
            message: message.into(),
            status: None,
        }
    }

    /// Configuration error raised while building a component
    pub fn config(operation: DriveOperation, message: impl fmt::Display) -> Self {
        ConnectorError::InvalidConfig(format!(
            "{} has a configuration error: {}",
            operation, message
        ))
    }

    /// The Drive operation this error belongs to, if any
    pub fn drive_operation(&self) -> Option<DriveOperation> {
        match self {
            ConnectorError::Operation { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl From<ConnectorError> for CoreError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Io(e) => CoreError::Io(e.to_string()),
            ConnectorError::Serialization(e) => CoreError::Serde(e.to_string()),
            ConnectorError::Core(e) => e,
            other => CoreError::InvalidInput(other.to_string()),
        }
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
