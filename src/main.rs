use anyhow::Result;
use clap::Parser;
use filechat::{config::Config, utils::init_logger};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "filechat")]
#[command(about = "Upload a CSV, TXT or PDF file and ask Claude questions about it", long_about = None)]
struct Cli {
    /// Directory for the rolling log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Base URL of the Messages API
    #[arg(long)]
    api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.log_dir {
        config.log.dir = dir;
    }
    if let Some(base) = cli.api_base {
        config.llm.api_base = base.trim_end_matches('/').to_string();
    }

    // Logs go to a file; the terminal is taken by the TUI
    let _guard = init_logger(&config.log)?;
    info!(log_dir = %config.log.dir.display(), api_base = %config.llm.api_base, "Configuration loaded");

    filechat::tui::run(config).await
}
