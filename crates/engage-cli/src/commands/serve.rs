//! Serve command - run the WebSocket frame endpoint.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use engage_adapters::ServerConfig;
use tracing::info;

use super::pipeline::ModelArgs;
use crate::config::AppConfig;

/// Arguments for the serve command.
#[derive(Args, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Do not send alert events
    #[arg(long)]
    pub no_alerts: bool,

    #[command(flatten)]
    pub models: ModelArgs,

    /// Merged config (populated by `with_config`, not from CLI).
    #[arg(skip)]
    config: AppConfig,
}

impl ServeArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        args.host = args.host.or_else(|| config.server.host.clone());
        args.port = args.port.or(config.server.port);
        if !args.no_alerts {
            args.no_alerts = !config.server.alerts.unwrap_or(true);
        }
        args.models = args.models.with_config(config);
        args.config = config.clone();
        args
    }

    /// Server settings with defaults filled in.
    pub fn server_config(&self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self.host.clone().unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            alerts: !self.no_alerts,
        }
    }
}

/// Run the serve command until interrupted.
///
/// Expects `args` to have been processed through `with_config()` first.
pub fn run(args: &ServeArgs) -> Result<()> {
    let pipeline = args.models.build_pipeline(&args.config)?;
    let server = args.server_config();
    info!("Starting server on {}:{}", server.host, server.port);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(engage_adapters::serve(&server, Arc::new(pipeline)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::commands::{Cli, Commands};

    fn parse(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Serve(args) => args,
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_defaults() {
        let args = ServeArgs::with_config(parse(&["engage", "serve"]), &AppConfig::default());
        let server = args.server_config();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 5000);
        assert!(server.alerts);
    }

    #[test]
    fn test_config_applies_when_flags_absent() {
        let config: AppConfig = toml::from_str(
            r"
[server]
host = '127.0.0.1'
port = 7000
alerts = false
",
        )
        .unwrap();
        let server = ServeArgs::with_config(parse(&["engage", "serve"]), &config).server_config();
        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 7000);
        assert!(!server.alerts);
    }

    #[test]
    fn test_flags_override_config() {
        let config: AppConfig = toml::from_str(
            r"
[server]
port = 7000
",
        )
        .unwrap();
        let args = parse(&["engage", "serve", "--port", "9001", "--no-alerts"]);
        let server = ServeArgs::with_config(args, &config).server_config();
        assert_eq!(server.port, 9001);
        assert!(!server.alerts);
    }

    #[test]
    fn test_port_zero_rejected() {
        assert!(Cli::try_parse_from(["engage", "serve", "--port", "0"]).is_err());
    }
}
