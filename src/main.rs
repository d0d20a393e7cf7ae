//! serve-webhooks: post-serve webhook dispatcher
//!
//! `serve-webhooks init` writes a config template; `serve-webhooks [fire]`
//! dispatches the configured webhook once for a synthetic served request.

use std::path::Path;
use std::process::ExitCode;

use serve_webhooks::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    match &cli.command {
        Some(Command::Init { output }) => init(output),
        Some(Command::Fire) | None => fire(&cli),
    }
}

/// Writes the commented config template to `output`.
fn init(output: &Path) -> ExitCode {
    if let Err(e) = write_default_config(output) {
        eprintln!("Error: {e}");
        return exit_code::CONFIG_ERROR;
    }

    println!("Configuration template written to: {}", output.display());
    exit_code::SUCCESS
}

/// Validates configuration, then runs one dispatch cycle on a fresh runtime.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn fire(cli: &Cli) -> ExitCode {
    let config = match ValidatedConfig::load(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    let result = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create Tokio runtime: {e}"))
        .and_then(|runtime| {
            runtime
                .block_on(run::execute(config))
                .map_err(|e| e.to_string())
        });

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(message) => {
            tracing::error!("{message}");
            exit_code::runtime_error()
        }
    }
}
