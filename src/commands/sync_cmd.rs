//! Sync CLI commands for pulling remote users into the local store.

use clap::{Args, Subcommand};

use crate::api::{ApiError, UsersApi};
use crate::config::Config;
use crate::db::UserRepository;
use crate::sync::Reconciler;

/// Sync with the remote users API
#[derive(Debug, Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and server status
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        repo: &UserRepository,
        config: &Config,
    ) -> Result<(), SyncCommandError> {
        match &self.command {
            None => self.sync(repo, config).await,
            Some(SyncSubcommand::Status) => self.status(repo, config).await,
        }
    }

    async fn sync(&self, repo: &UserRepository, config: &Config) -> Result<(), SyncCommandError> {
        let api = UsersApi::new(&config.api_base_url.value);

        println!("Syncing with {}...", config.api_base_url.value);
        println!();

        let remote_users = api.list().await?;
        let reconciler = Reconciler::new(repo);
        let report = reconciler.merge_remote(remote_users).await?;

        println!("  ✓ {} user(s) received", report.processed);
        if report.inserted > 0 {
            println!("  ✓ {} added", report.inserted);
        }
        if report.merged > 0 {
            println!("  ✓ {} updated", report.merged);
        }
        if report.skipped_deleted > 0 {
            println!("  ✓ {} skipped (deleted locally)", report.skipped_deleted);
        }

        println!();
        if report.changed() {
            println!("Sync complete.");
        } else {
            println!("Already up to date.");
        }

        Ok(())
    }

    async fn status(
        &self,
        repo: &UserRepository,
        config: &Config,
    ) -> Result<(), SyncCommandError> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        println!("Server:    {}", config.api_base_url.value);
        println!("  source: {}", config.api_base_url.source);
        println!("Database:  {}", config.database_path.value.display());
        println!("  source: {}", config.database_path.source);
        println!();

        let local_count = repo.get_all().await?.len();
        println!("Local users: {}", local_count);
        println!();

        // Try a fetch to check server status
        print!("Server status: ");

        let api = UsersApi::new(&config.api_base_url.value);
        match api.list().await {
            Ok(users) => println!("✓ connected ({} users remote)", users.len()),
            Err(ApiError::Network) => println!("✗ unreachable"),
            Err(e) => println!("✗ error: {}", e),
        }

        Ok(())
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    ApiError(ApiError),
    StoreError(sqlx::Error),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::ApiError(e) => write!(f, "{}", e),
            SyncCommandError::StoreError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::ApiError(e) => Some(e),
            SyncCommandError::StoreError(e) => Some(e),
        }
    }
}

impl From<ApiError> for SyncCommandError {
    fn from(e: ApiError) -> Self {
        SyncCommandError::ApiError(e)
    }
}

impl From<sqlx::Error> for SyncCommandError {
    fn from(e: sqlx::Error) -> Self {
        SyncCommandError::StoreError(e)
    }
}
