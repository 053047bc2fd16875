//! CLI command definitions and handlers.

pub mod analyze;
pub mod models;
pub mod pipeline;
pub mod serve;

use clap::{Parser, Subcommand};

/// Engage - engagement signals from face landmarks, gestures and emotion
#[derive(Parser)]
#[command(name = "engage")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve the WebSocket frame endpoint
    Serve(serve::ServeArgs),
    /// Analyze image files as frames
    Analyze(analyze::AnalyzeArgs),
    /// Manage model weights
    Models(models::ModelsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Everything went through.
    Success,
    /// At least one frame was dropped.
    FramesDropped,
    /// The command failed.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::FramesDropped => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}

/// Parse and validate a value in 0.0..=1.0.
fn parse_unit(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0.0..=1.0"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_unit() {
        assert_eq!(parse_unit("0.5"), Ok(0.5));
        assert_eq!(parse_unit("0"), Ok(0.0));
        assert_eq!(parse_unit("1"), Ok(1.0));
        assert!(parse_unit("1.5").is_err());
        assert!(parse_unit("-0.1").is_err());
        assert!(parse_unit("abc").unwrap_err().contains("not a valid number"));
    }
}
