use std::path::PathBuf;

use audiobait_core::storage::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "audiobait", version, about = "Play lure sounds inside a daily window")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Include timestamps in log output
    #[arg(short, long, global = true)]
    timestamps: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the burst scheduler (default)
    Run,
    /// Show the playback window and time until it opens
    Window,
    /// Download missing sound files from the backend
    Sync,
    /// Print the backend schedule for this device
    Schedule,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.timestamps);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&cli.config).await,
        Commands::Window => commands::window::run(&cli.config),
        Commands::Sync => commands::sync::run(&cli.config).await,
        Commands::Schedule => commands::schedule::run(&cli.config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
