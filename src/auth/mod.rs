//! Authentication and session management

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod session;

pub use jwt::{create_token, validate_token, Claims};
pub use middleware::{extract_claims, require_auth};
pub use models::{User, UserRole};
pub use password::{hash_password, verify_password};
pub use session::{Session, SessionStore};
