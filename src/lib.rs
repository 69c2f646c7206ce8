//! Pitcrew - Membership portal API for an FRC robotics team
//!
//! This is the library interface for Pitcrew, exposing the auth,
//! storage and HTTP layers for programmatic use and integration tests.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
