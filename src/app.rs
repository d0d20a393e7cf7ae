//! Process-level glue for the binary: exit codes, logging, error hints.

use serve_webhooks::config::ConfigError;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit codes reported by the binary.
pub mod exit_code {
    use std::process::ExitCode;

    /// Webhook delivered, or config template written (0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Arguments or config file rejected before anything was sent (1).
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Delivery failed, timed out, or was interrupted (2).
    ///
    /// `ExitCode::from` is not `const`, hence a function.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Suggests a next step for configuration errors that have an obvious one.
pub fn print_config_hint(error: &ConfigError) {
    let hint = match error {
        ConfigError::MissingUrl | ConfigError::Read { .. } => {
            "Run 'serve-webhooks init' to generate a configuration template."
        }
        ConfigError::Template(_) => {
            "Body templates use Handlebars syntax, e.g. '{\"path\": \"{{request.path}}\"}'."
        }
        ConfigError::UnknownMethod(_) => {
            "Supported methods: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS, TRACE."
        }
        _ => return,
    };

    eprintln!("\n{hint}");
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default level, which is DEBUG with `--verbose`
/// and INFO otherwise.
pub fn setup_tracing(verbose: bool) {
    let default_level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
