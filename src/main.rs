use std::path::PathBuf;

use adstitch::{cli, config, server};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "adstitch", about = "AI-driven ad placement & video composition pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default if no subcommand is given).
    Serve,
    /// Run placement-only analysis over a submission-shaped JSON file and
    /// print the result to stdout.
    Place {
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load config: {e}");
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("starting adstitch in {} mode", if config.is_dev { "DEV" } else { "PROD" });
            if let Err(e) = server::start(config).await {
                error!("failed to start server: {e}");
                std::process::exit(1);
            }
        }
        Command::Place { input } => {
            if let Err(e) = cli::run_place(config, &input).await {
                error!("placement analysis failed: {e}");
                std::process::exit(1);
            }
        }
    }
}
