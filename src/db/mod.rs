//! SQLite persistence layer

pub mod audit;
pub mod migrations;
pub mod pool;
pub mod settings;
pub mod users;

pub use audit::{AuditEntry, AuditLog};
pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
pub use settings::SettingsRepository;
pub use users::{NewUser, UserRepository};
