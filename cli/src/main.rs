mod generate;
mod water;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "brewgen")]
#[command(about = "Brewgen CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe with the configured model and print it as JSON
    Generate {
        /// Recipe request JSON file
        #[arg(long)]
        request: PathBuf,
        /// Owner the recipe is saved for
        #[arg(long, default_value = "cli")]
        owner: String,
        /// Print the whole outcome (constraints, sanitizer report, stages, persistence)
        #[arg(long)]
        verbose: bool,
    },
    /// Print the constraints and prompt derived from a request, without calling a model
    Constraints {
        /// Recipe request JSON file
        #[arg(long)]
        request: PathBuf,
    },
    /// Sanitize a recipe draft against a request and print the result
    Normalize {
        /// Recipe request JSON file
        #[arg(long)]
        request: PathBuf,
        /// Raw model output (JSON, fenced or not)
        #[arg(long)]
        draft: PathBuf,
    },
    /// Compute salt and acid additions between two water profiles
    Water {
        /// Source water profile JSON file
        #[arg(long)]
        source: PathBuf,
        /// Target water profile JSON file
        #[arg(long)]
        target: PathBuf,
        /// Volume of brewing liquor in litres
        #[arg(long)]
        litres: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            request,
            owner,
            verbose,
        } => {
            generate::generate(&request, &owner, verbose).await?;
        }
        Commands::Constraints { request } => {
            generate::constraints(&request)?;
        }
        Commands::Normalize { request, draft } => {
            generate::normalize(&request, &draft)?;
        }
        Commands::Water {
            source,
            target,
            litres,
        } => {
            water::additions(&source, &target, litres)?;
        }
    }

    Ok(())
}

/// Read and deserialize a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
