//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gdrive",
    about = "Run Google Drive components against a single message",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Component manifest (YAML or JSON)
    #[arg(
        short,
        long,
        global = true,
        env = "GDRIVE_MANIFEST",
        default_value = "./gdrive.yaml",
        help = "Path to the component manifest"
    )]
    pub manifest: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available component types
    Components {
        /// Print as JSON instead of a table
        #[arg(long, help = "Print as JSON")]
        json: bool,
    },

    /// Build one component from the manifest and apply it to a message
    Run {
        /// Component name as declared under `components`
        #[arg(help = "Component name from the manifest")]
        component: String,

        /// Text payload
        #[arg(short, long, help = "Inbound payload as text")]
        payload: Option<String>,

        /// Binary payload read from a file
        #[arg(
            long,
            conflicts_with = "payload",
            help = "Read the inbound payload from a file (binary)"
        )]
        payload_file: Option<PathBuf>,

        /// Mime type of the inbound payload
        #[arg(long, help = "Mime type of the inbound payload")]
        mime_type: Option<String>,

        /// Inbound message attributes
        #[arg(long = "attribute", value_name = "KEY=VALUE", help = "Message attribute")]
        attributes: Vec<String>,

        /// Flow context variables
        #[arg(long = "var", value_name = "KEY=VALUE", help = "Flow context variable")]
        variables: Vec<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
        format: OutputFormat,

        /// Save output to file
        #[arg(long, help = "Save output to file")]
        output: Option<PathBuf>,
    },

    /// Build every component in the manifest without running it
    Validate,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Compact JSON with payload and attributes
    Json,
    /// Pretty-printed JSON with payload and attributes
    Pretty,
    /// Payload bytes only
    Raw,
}
