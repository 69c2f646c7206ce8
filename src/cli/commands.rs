//! CLI command implementations

use anyhow::Result;
use std::fs;

use crate::auth::models::UserRole;
use crate::auth::password;
use crate::cli::{info, success, warn, RegistrationAction};
use crate::config::{self, load_config};
use crate::db::{self, settings::REGISTRATION_ENABLED, NewUser, SettingsRepository, UserRepository};

/// Initialize a new pitcrew.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = std::path::Path::new("pitcrew.toml");

    if config_path.exists() {
        warn("pitcrew.toml already exists");
        return Ok(());
    }

    let content = config::default_config_content();
    fs::write(config_path, content)?;

    success("Created pitcrew.toml");
    info("Edit the configuration file, then run 'pitcrew migrate' and 'pitcrew serve'");

    Ok(())
}

/// Apply pending database migrations
pub async fn migrate() -> Result<()> {
    let config = load_config()?;
    let pool = db::create_pool(&config.database).await?;

    db::run_migrations(&pool).await?;

    let applied = db::migrations::applied_migrations(&pool).await?;
    success(&format!("Database is up to date ({} migrations)", applied.len()));

    Ok(())
}

/// Run the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    crate::api::run_server(config, &host, port).await?;
    Ok(())
}

/// Create a user account, prompting for the password
pub async fn add_user(email: &str, name: &str, role: &str) -> Result<()> {
    let role: UserRole = role.parse()?;

    let config = load_config()?;
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let plain = dialoguer::Password::new()
        .with_prompt(format!("Password for {}", email))
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let password_hash = password::hash_password(&plain)?;

    let users = UserRepository::new(pool);
    let user = users
        .create(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash,
            role,
        })
        .await?;

    success(&format!("Created {} account {} (id {})", user.role, user.email, user.id));
    Ok(())
}

/// Manage the self-registration site setting
pub async fn registration(action: RegistrationAction) -> Result<()> {
    let config = load_config()?;
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let settings = SettingsRepository::new(pool);

    match action {
        RegistrationAction::Enable => {
            settings.set(REGISTRATION_ENABLED, "true").await?;
            success("Self-registration enabled");
        }
        RegistrationAction::Disable => {
            settings.set(REGISTRATION_ENABLED, "false").await?;
            success("Self-registration disabled");
        }
        RegistrationAction::Status => {
            if settings.registration_enabled().await? {
                info("Self-registration is enabled");
            } else {
                info("Self-registration is disabled");
            }
        }
    }

    Ok(())
}
