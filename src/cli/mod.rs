//! CLI interface for Pitcrew

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pitcrew")]
#[command(version = "1.0.0")]
#[command(about = "Membership portal API for an FRC robotics team", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new pitcrew.toml configuration file
    Init,

    /// Apply pending database migrations
    Migrate,

    /// Run the HTTP API server
    Serve {
        /// Bind host (defaults to the configured server.host)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (defaults to the configured server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create a user account, prompting for the password
    AddUser {
        /// Email address for the new account
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role: admin, member or guest
        #[arg(short, long, default_value = "member")]
        role: String,
    },

    /// Manage the self-registration site setting
    Registration {
        #[command(subcommand)]
        action: RegistrationAction,
    },
}

#[derive(Subcommand)]
pub enum RegistrationAction {
    /// Open self-registration
    Enable,
    /// Close self-registration
    Disable,
    /// Show whether self-registration is open
    Status,
}
