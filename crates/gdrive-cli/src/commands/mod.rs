pub mod components;
pub mod run;
pub mod validate;

// Re-export command handlers
pub use components::ComponentsCommand;
pub use run::{RunCommand, RunRequest};
pub use validate::ValidateCommand;
