//! Core model shared by the Google Drive connectors: messages, flow context,
//! dynamic values and payload conversion.

pub mod context;
pub mod converter;
pub mod env_resolver;
pub mod error;
pub mod expression;
pub mod message;

pub use context::FlowContext;
pub use env_resolver::EnvResolver;
pub use error::{CoreError, CoreResult};
pub use expression::DynamicValue;
pub use message::{Attributes, Message, MessageBuilder, MimeType, Payload};
