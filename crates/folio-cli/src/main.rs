mod platforms;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_core::Category;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "folio-cli")]
#[command(about = "Coding-platform achievements command line interface")]
struct Cli {
    /// Path to the platforms registry (overrides FOLIO_PLATFORMS_PATH)
    #[arg(long, global = true)]
    platforms: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch statistics from every platform and print the merged results
    Stats {
        /// Only show platforms in this category (competitive, practice)
        #[arg(long)]
        category: Option<Category>,

        /// Print the result mapping as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List configured platforms
    Platforms {
        /// Only show platforms in this category (competitive, practice)
        #[arg(long)]
        category: Option<Category>,
    },
    /// Load and validate the platforms registry
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = folio_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let platforms_path = cli
        .platforms
        .clone()
        .unwrap_or_else(|| config.platforms_path.clone());
    tracing::debug!(path = %platforms_path.display(), "using platforms registry");

    match cli.command {
        Some(Commands::Stats { category, json }) => {
            stats::run_stats(&config, &platforms_path, category, json).await?;
        }
        Some(Commands::Platforms { category }) => {
            platforms::run_platforms(&platforms_path, category)?;
        }
        Some(Commands::Validate) => platforms::run_validate(&platforms_path)?,
        None => println!("no command given; try `folio-cli stats` or `folio-cli --help`"),
    }

    Ok(())
}
