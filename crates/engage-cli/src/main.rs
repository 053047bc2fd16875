//! Engage CLI - engagement signals from a live frame stream or image files.

mod commands;
mod config;
mod output;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Commands::Serve(args) => {
            let config = AppConfig::load();
            let args = commands::serve::ServeArgs::with_config(args, &config);
            match commands::serve::run(&args) {
                Ok(()) => ExitCode::Success,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
        Commands::Analyze(args) => {
            let config = AppConfig::load();
            let args = commands::analyze::AnalyzeArgs::with_config(args, &config);
            match commands::analyze::run(&args) {
                Ok(summary) => {
                    info!(
                        "Analyzed {} frames, dropped {}",
                        summary.processed, summary.dropped
                    );
                    summary.exit_code
                }
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
        Commands::Models(args) => {
            let config = AppConfig::load();
            match commands::models::run(&args, &config) {
                Ok(()) => ExitCode::Success,
                Err(e) => {
                    eprintln!("error: {e:#}");
                    ExitCode::Error
                }
            }
        }
    };

    exit_code.into()
}
