mod offline;
mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use postcraft_core::Platform;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "postcraft")]
#[command(about = "Turn a URL into scored social media posts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline for a URL and print progress
    Run {
        url: String,

        /// Target platform; repeat for several. Defaults to POSTCRAFT_DEFAULT_PLATFORMS
        #[arg(long = "platform", short = 'p')]
        platforms: Vec<Platform>,

        /// Print each event as a JSON line instead of a readable summary
        #[arg(long)]
        json: bool,
    },
    /// Show how a text file would be split into batches
    Split {
        file: PathBuf,

        #[arg(long, default_value_t = 8000)]
        chunk_size: usize,

        #[arg(long, default_value_t = 500)]
        overlap: usize,

        #[arg(long, default_value_t = 10)]
        max_batches: usize,
    },
    /// Heuristic score for a post, without calling the model
    Score {
        text: String,

        /// Also check the text against this platform's limits
        #[arg(long)]
        platform: Option<Platform>,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            url,
            platforms,
            json,
        } => {
            let config = postcraft_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            run::run_pipeline(&config, url, platforms, json).await
        }
        Commands::Split {
            file,
            chunk_size,
            overlap,
            max_batches,
        } => {
            init_tracing("warn")?;
            offline::run_split(&file, chunk_size, overlap, max_batches)
        }
        Commands::Score { text, platform } => {
            init_tracing("warn")?;
            offline::run_score(&text, platform)
        }
    }
}

#[cfg(test)]
mod tests;
