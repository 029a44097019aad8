pub mod auth;
pub mod client;
pub mod command;
pub mod component;
pub mod config;
pub mod error;
pub mod mapper;
pub mod model;

// Re-export commonly used types
pub use client::DriveClient;
pub use command::{Command, DriveApi, DriveApiFactory};
pub use component::{ComponentFactory, ComponentKind, Processor};
pub use config::DriveConfiguration;
pub use error::{ClientError, ClientResult, ConnectorError, ConnectorResult, DriveOperation};
