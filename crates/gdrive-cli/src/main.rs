//! gdrive CLI entry point

use clap::Parser;
use gdrive_cli::{
    cli::{Cli, Commands},
    commands::{ComponentsCommand, RunCommand, RunRequest, ValidateCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("gdrive CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Components { json } => ComponentsCommand::run(json),

        Commands::Validate => ValidateCommand::run(&cli.manifest),

        Commands::Run {
            component,
            payload,
            payload_file,
            mime_type,
            attributes,
            variables,
            format,
            output,
        } => {
            let request = RunRequest {
                component,
                payload,
                payload_file,
                mime_type,
                attributes,
                variables,
                format,
                output,
            };
            RunCommand::run(&cli.manifest, request).await
        }
    }
}
