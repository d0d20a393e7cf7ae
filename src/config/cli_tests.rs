//! Tests for CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

use super::cli::{Cli, Command};

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_args() {
        let cli =
            Cli::parse_from_iter(["serve-webhooks", "--url", "http://localhost:8080/callback"]);

        assert_eq!(cli.url.as_deref(), Some("http://localhost:8080/callback"));
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_webhook_options() {
        let cli = Cli::parse_from_iter([
            "serve-webhooks",
            "--url",
            "https://example.com/hook",
            "--method",
            "PUT",
            "--header",
            "X-Api-Key=secret",
            "--header",
            "Content-Type: application/json",
            "--body",
            r#"{"path":"{{request.path}}"}"#,
        ]);

        assert_eq!(cli.method.as_deref(), Some("PUT"));
        assert_eq!(cli.headers, ["X-Api-Key=secret", "Content-Type: application/json"]);
        assert_eq!(cli.body.as_deref(), Some(r#"{"path":"{{request.path}}"}"#));
    }

    #[test]
    fn parse_dispatcher_options() {
        let cli = Cli::parse_from_iter([
            "serve-webhooks",
            "--workers",
            "4",
            "--queue-capacity",
            "16",
            "--timeout",
            "5",
            "--files-root",
            "/srv/files",
        ]);

        assert_eq!(cli.workers, Some(4));
        assert_eq!(cli.queue_capacity, Some(16));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.files_root, Some(PathBuf::from("/srv/files")));
    }

    #[test]
    fn parse_served_request_options() {
        let cli = Cli::parse_from_iter([
            "serve-webhooks",
            "--request-method",
            "POST",
            "--request-url",
            "/orders?id=1",
            "--request-body",
            "{}",
        ]);

        assert_eq!(cli.request_method.as_deref(), Some("POST"));
        assert_eq!(cli.request_url.as_deref(), Some("/orders?id=1"));
        assert_eq!(cli.request_body.as_deref(), Some("{}"));
    }

    #[test]
    fn parse_config_and_verbose_short_flags() {
        let cli = Cli::parse_from_iter(["serve-webhooks", "-c", "hooks.toml", "-v"]);

        assert_eq!(cli.config, Some(PathBuf::from("hooks.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn non_numeric_workers_is_rejected() {
        let result = Cli::try_parse_from(["serve-webhooks", "--workers", "many"]);

        assert!(result.is_err());
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn init_uses_default_output() {
        let cli = Cli::parse_from_iter(["serve-webhooks", "init"]);

        assert!(cli.is_init());
        assert!(matches!(
            cli.command,
            Some(Command::Init { ref output }) if output == &PathBuf::from("serve-webhooks.toml")
        ));
    }

    #[test]
    fn init_with_custom_output() {
        let cli = Cli::parse_from_iter(["serve-webhooks", "init", "-o", "custom.toml"]);

        assert!(matches!(
            cli.command,
            Some(Command::Init { ref output }) if output == &PathBuf::from("custom.toml")
        ));
    }

    #[test]
    fn fire_subcommand() {
        let cli = Cli::parse_from_iter(["serve-webhooks", "fire"]);

        assert!(matches!(cli.command, Some(Command::Fire)));
        assert!(!cli.is_init());
    }

    #[test]
    fn url_is_global() {
        let cli = Cli::parse_from_iter(["serve-webhooks", "fire", "--url", "http://x/"]);

        assert_eq!(cli.url.as_deref(), Some("http://x/"));
    }
}
