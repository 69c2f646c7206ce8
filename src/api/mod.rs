//! HTTP API server

pub mod error;
pub mod routes;
pub mod server;

pub use server::*;
