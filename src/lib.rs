//! ChurchHub
//!
//! Backend for a church administration dashboard: member directory, cell
//! groups and ministries, events with attendance, donations, and bulk
//! member import/export from CSV and Excel files.

#![allow(non_snake_case)]

pub mod api;
pub mod config;
pub mod database;
pub mod export;
pub mod import;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{ChurchHubError, Result};

// Re-export main components for easy access
pub use api::{router, AppState};
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
