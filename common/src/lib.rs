//! Shared building blocks for the database administration service.
//!
//! Holds the data model, error taxonomy, configuration and HTTP plumbing that
//! the service crate builds on.

pub mod config;
pub mod errors;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod utils;
