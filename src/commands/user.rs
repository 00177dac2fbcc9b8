use clap::{Args, Subcommand, ValueEnum};
use std::io::{self, Write};

use crate::api::UsersApi;
use crate::config::Config;
use crate::db::UserRepository;
use crate::factory::{NewUser, UserFactory};
use crate::location::{ConfiguredLocation, GeoPoint, LocationProvider};
use crate::models::User;
use crate::sync::Reconciler;
use crate::validate;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// List users, refreshing from the server first
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Filter by name, username, or email
        #[arg(long)]
        search: Option<String>,

        /// Skip the remote refresh and list local records only
        #[arg(long)]
        offline: bool,
    },

    /// Show a user's details
    Show {
        /// User ID
        id: i64,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new user
    Create {
        /// Full name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Phone number
        #[arg(long)]
        phone: String,

        /// Latitude for the new user's address
        #[arg(long, requires = "lng")]
        lat: Option<f64>,

        /// Longitude for the new user's address
        #[arg(long, requires = "lat")]
        lng: Option<f64>,

        /// Use the location from the config file for the address
        #[arg(long, conflicts_with_all = ["lat", "lng"])]
        locate: bool,
    },

    /// Edit a user's name or email
    Edit {
        /// User ID
        id: i64,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New email
        #[arg(long)]
        email: Option<String>,
    },

    /// Delete a user
    Delete {
        /// User ID
        id: i64,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl UserCommand {
    pub async fn run(
        &self,
        repo: &UserRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            UserSubcommand::List {
                format,
                search,
                offline,
            } => {
                if !offline {
                    refresh_from_remote(repo, config).await;
                }

                let users = match search {
                    Some(term) => repo.search(term).await?,
                    None => repo.get_all().await?,
                };

                if users.is_empty() {
                    println!("No users found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&users)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<5}  {:<24}  {:<20}  EMAIL", "ID", "NAME", "USERNAME");
                        println!("{}", "-".repeat(80));
                        for user in &users {
                            let name = truncate_name(&user.name);
                            let marker = if user.is_local_only { " *" } else { "" };
                            println!(
                                "{:<5}  {:<24}  {:<20}  {}{}",
                                user.id, name, user.username, user.email, marker
                            );
                        }
                        println!("\nTotal: {} user(s)", users.len());
                        if users.iter().any(|u| u.is_local_only) {
                            println!("* created locally, not yet synced");
                        }
                    }
                }
                Ok(())
            }

            UserSubcommand::Show { id, format } => {
                let user = repo.get_by_id(*id).await?;

                match user {
                    Some(user) => {
                        match format {
                            OutputFormat::Json => {
                                println!("{}", serde_json::to_string_pretty(&local_json(&user)?)?);
                            }
                            OutputFormat::Text => {
                                println!("{}", user);
                            }
                        }
                        Ok(())
                    }
                    None => Err(format!("User not found: {}", id).into()),
                }
            }

            UserSubcommand::Create {
                name,
                email,
                phone,
                lat,
                lng,
                locate,
            } => {
                let checks = [
                    validate::validate_required(name, "Name"),
                    validate::validate_email(email),
                    validate::validate_phone(phone),
                ];
                for check in checks {
                    if !check.is_valid {
                        return Err(check.error_message.unwrap_or_default().into());
                    }
                }

                let point = if let (Some(lat), Some(lng)) = (lat, lng) {
                    Some(GeoPoint {
                        lat: *lat,
                        lng: *lng,
                    })
                } else if *locate {
                    let provider = ConfiguredLocation::from_config(config.location.as_ref());
                    match provider.current_location() {
                        Ok(point) => Some(point),
                        Err(e) => {
                            eprintln!("Warning: {}; using default coordinates", e);
                            None
                        }
                    }
                } else {
                    None
                };

                let factory = UserFactory::new(repo);
                let user = factory
                    .build(
                        NewUser {
                            name: name.clone(),
                            email: email.clone(),
                            phone: phone.clone(),
                        },
                        point,
                    )
                    .await?;
                let created = repo.create(&user).await?;

                println!("Created user:");
                println!("{}", created);

                // Push to the server. The response is discarded; the record
                // keeps its local-only flag.
                let api = UsersApi::new(&config.api_base_url.value);
                if let Err(e) = api.create(&created).await {
                    tracing::warn!("Failed to push new user {}: {}", created.id, e);
                    eprintln!("Warning: could not reach server: {} (saved locally)", e);
                }
                Ok(())
            }

            UserSubcommand::Edit { id, name, email } => {
                if name.is_none() && email.is_none() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let user = match repo.get_by_id(*id).await? {
                    Some(u) => u,
                    None => return Err(format!("User not found: {}", id).into()),
                };
                if user.is_deleted {
                    return Err(format!("User {} was deleted locally", id).into());
                }

                if let Some(new_name) = name {
                    let check = validate::validate_required(new_name, "Name");
                    if !check.is_valid {
                        return Err(check.error_message.unwrap_or_default().into());
                    }
                }
                if let Some(new_email) = email {
                    let check = validate::validate_email(new_email);
                    if !check.is_valid {
                        return Err(check.error_message.unwrap_or_default().into());
                    }
                }

                let new_name = name.as_deref().unwrap_or(&user.name);
                let new_email = email.as_deref().unwrap_or(&user.email);
                let updated = repo.update_contact(*id, new_name, new_email).await?;

                println!("Updated user:");
                println!("{}", updated);

                // Send the full merged record so the server sees the same
                // contact info
                let api = UsersApi::new(&config.api_base_url.value);
                if let Err(e) = api.update(&updated).await {
                    tracing::warn!("Failed to push update for user {}: {}", id, e);
                    eprintln!("Warning: could not reach server: {} (saved locally)", e);
                }
                Ok(())
            }

            UserSubcommand::Delete { id, force } => {
                let user = match repo.get_by_id(*id).await? {
                    Some(u) => u,
                    None => return Err(format!("User not found: {}", id).into()),
                };
                if user.is_deleted {
                    println!("User {} is already deleted.", id);
                    return Ok(());
                }

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete user '{}'? [y/N] ", user.name);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                // Remote first. If the server refuses, the local record is
                // left untouched.
                let api = UsersApi::new(&config.api_base_url.value);
                if api.delete(user.id).await? {
                    repo.soft_delete(user.id).await?;
                    println!("Deleted user: {}", user.name);
                }
                Ok(())
            }
        }
    }
}

/// Pull the latest users from the server and merge them into the local
/// store. Network failures degrade to the local data instead of failing
/// the command.
async fn refresh_from_remote(repo: &UserRepository, config: &Config) {
    let api = UsersApi::new(&config.api_base_url.value);
    match api.list().await {
        Ok(remote_users) => {
            let reconciler = Reconciler::new(repo);
            if let Err(e) = reconciler.merge_remote(remote_users).await {
                tracing::warn!("Failed to merge remote users: {}", e);
                eprintln!("Warning: could not save remote users: {}", e);
            }
        }
        Err(e) => {
            tracing::warn!("Remote fetch failed: {}", e);
            eprintln!("Warning: {}; showing local data", e);
        }
    }
}

/// Shortens a name to the list column width without splitting a character.
fn truncate_name(name: &str) -> String {
    if name.chars().count() > 24 {
        let prefix: String = name.chars().take(21).collect();
        format!("{}...", prefix)
    } else {
        name.to_string()
    }
}

/// JSON view for local inspection: the wire shape plus any local flag
/// that is set, since those flags never serialize.
fn local_json(user: &User) -> Result<serde_json::Value, serde_json::Error> {
    let mut value = serde_json::to_value(user)?;
    if user.is_deleted {
        value["is_deleted"] = serde_json::Value::Bool(true);
    }
    if user.is_local_only {
        value["is_local_only"] = serde_json::Value::Bool(true);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            name: "Leanne Graham".to_string(),
            username: "leanne.graham".to_string(),
            email: "leanne@example.com".to_string(),
            phone: "555-1234".to_string(),
            website: String::new(),
            address: None,
            company: None,
            is_deleted: false,
            is_local_only: false,
        }
    }

    #[test]
    fn test_truncate_name_keeps_short_names() {
        assert_eq!(truncate_name("Leanne Graham"), "Leanne Graham");
    }

    #[test]
    fn test_truncate_name_shortens_long_names() {
        let name = "A Very Long Name That Overflows";
        assert_eq!(truncate_name(name), "A Very Long Name That...");
    }

    #[test]
    fn test_truncate_name_counts_chars_not_bytes() {
        // 13 characters but 26 bytes; short enough to keep whole
        let name = "ÀÁÂÃÄÅÆÇÈÉÊËÌ";
        assert_eq!(truncate_name(name), name);
    }

    #[test]
    fn test_truncate_name_cuts_multibyte_on_char_boundary() {
        let name = "é".repeat(30);
        assert_eq!(truncate_name(&name), format!("{}...", "é".repeat(21)));
    }

    #[test]
    fn test_local_json_marks_deleted() {
        let mut user = sample_user();
        user.is_deleted = true;

        let value = local_json(&user).unwrap();
        assert_eq!(value["is_deleted"], serde_json::Value::Bool(true));
        assert_eq!(value["name"], "Leanne Graham");
    }

    #[test]
    fn test_local_json_marks_local_only() {
        let mut user = sample_user();
        user.is_local_only = true;

        let value = local_json(&user).unwrap();
        assert_eq!(value["is_local_only"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_local_json_plain_for_active_user() {
        let value = local_json(&sample_user()).unwrap();
        assert!(value.get("is_deleted").is_none());
        assert!(value.get("is_local_only").is_none());
    }
}
