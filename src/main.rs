use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod commands;
mod config;
mod db;
mod factory;
mod location;
mod models;
mod sync;
mod validate;

use commands::{ConfigCommand, SyncCommand, UserCommand};
use config::Config;
use db::{init_db, UserRepository};

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "An offline-first user directory", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User(UserCommand),

    /// Pull remote users into the local store
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::User(cmd)) => {
            let pool = init_db(Some(config.database_path.value.clone())).await?;
            let repo = UserRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let pool = init_db(Some(config.database_path.value.clone())).await?;
            let repo = UserRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
