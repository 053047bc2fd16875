//! Models command - manage model weights.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use engage_adapters::models::ModelStatus;
use engage_adapters::ModelStore;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::AppConfig;

/// Arguments for the models command
#[derive(Args)]
pub struct ModelsArgs {
    /// Custom models directory (overrides default and config)
    #[arg(long, value_name = "DIR", global = true)]
    pub models_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Models subcommands
#[derive(Subcommand)]
pub enum ModelsCommand {
    /// Download required models
    Fetch {
        /// Download again even if already installed
        #[arg(long)]
        force: bool,
    },
    /// List installed models
    List,
    /// Print model directory path
    Path,
}

/// Run the models command.
pub fn run(args: &ModelsArgs, config: &AppConfig) -> Result<()> {
    let store = ModelStore::from_override(
        args.models_dir
            .clone()
            .or_else(|| config.models.dir.clone()),
    );
    match args.command {
        ModelsCommand::Fetch { force } => fetch_models(&store, force),
        ModelsCommand::List => {
            print!("{}", render_list(store.dir(), &store.list()));
            Ok(())
        }
        ModelsCommand::Path => {
            println!("{}", store.dir().display());
            Ok(())
        }
    }
}

fn fetch_models(store: &ModelStore, force: bool) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| anyhow::anyhow!("Invalid progress template: {e}"))?,
    );
    pb.set_message(format!("fetching into {}", store.dir().display()));

    let report: &dyn Fn(&str, u64) = &|name, bytes| {
        pb.println(format!("  downloaded {name} ({bytes} bytes)"));
    };
    let fetched = store.fetch_all(force, Some(report))?;

    if fetched.is_empty() {
        pb.finish_with_message("All models already installed");
    } else {
        pb.finish_with_message(format!("Downloaded {}", fetched.join(", ")));
    }
    Ok(())
}

fn render_list(dir: &std::path::Path, models: &[ModelStatus]) -> String {
    let mut out = format!("Models directory: {}\n\n", dir.display());
    for status in models {
        let mark = if status.installed { "✓" } else { "✗" };
        out.push_str(&format!(
            "  {mark} {} ({}, {})\n",
            status.model.name, status.model.filename, status.model.purpose
        ));
    }
    let installed = models.iter().filter(|m| m.installed).count();
    out.push_str(&format!("\n{installed}/{} models installed\n", models.len()));
    out
}
