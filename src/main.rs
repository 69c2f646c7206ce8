use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod db;
mod error;

pub mod api;
pub mod auth;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pitcrew=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Migrate => cli::commands::migrate().await,
        Commands::Serve { host, port } => cli::commands::serve(host, port).await,
        Commands::AddUser { email, name, role } => cli::commands::add_user(&email, &name, &role).await,
        Commands::Registration { action } => cli::commands::registration(action).await,
    }
}
