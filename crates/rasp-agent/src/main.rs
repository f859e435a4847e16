//! RASP Agent - Entry Point
//!
//! Loads the agent settings, boots the configuration engine and keeps it
//! running until Ctrl-C.

use clap::Parser;
use rasp_agent::run;

/// Command line interface for the RASP agent
#[derive(Parser, Debug)]
#[command(name = "rasp-agent")]
#[command(about = "RASP agent - dynamic configuration engine")]
#[command(version)]
pub struct Cli {
    /// Path to the agent settings file (TOML)
    #[arg(short, long)]
    pub settings: Option<std::path::PathBuf>,

    /// Agent base directory holding `conf/` and `assets/`
    #[arg(short, long)]
    pub base_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli.settings.as_deref(), cli.base_dir.as_deref()).await
}
