//! Error handling for ChurchHub
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;
use uuid::Uuid;

use crate::import::MemberField;

/// Main error type for ChurchHub application
#[derive(Error, Debug)]
pub enum ChurchHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Spreadsheet export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Member not found: {member_id}")]
    MemberNotFound { member_id: i64 },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Donation not found: {donation_id}")]
    DonationNotFound { donation_id: i64 },

    #[error("Import job not found: {job_id}")]
    ImportJobNotFound { job_id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Bulk import specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Uploaded file is empty or has no header row")]
    EmptyFile,

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to parse uploaded file: {0}")]
    Parse(String),

    #[error("Required field is not mapped to any column: {0}")]
    RequiredFieldUnmapped(MemberField),

    #[error("Column index {column} is out of range ({width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },

    #[error("Upload exceeds the maximum size of {max_bytes} bytes")]
    TooLarge { max_bytes: usize },
}

/// Result type alias for ChurchHub operations
pub type Result<T> = std::result::Result<T, ChurchHubError>;

/// Result type alias for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

impl ChurchHubError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ChurchHubError::Database(_) => false,
            ChurchHubError::Migration(_) => false,
            ChurchHubError::Import(_) => false,
            ChurchHubError::Xlsx(_) => false,
            ChurchHubError::Csv(_) => false,
            ChurchHubError::Config(_) => false,
            ChurchHubError::PermissionDenied(_) => false,
            ChurchHubError::MemberNotFound { .. } => false,
            ChurchHubError::GroupNotFound { .. } => false,
            ChurchHubError::EventNotFound { .. } => false,
            ChurchHubError::DonationNotFound { .. } => false,
            ChurchHubError::ImportJobNotFound { .. } => false,
            ChurchHubError::Conflict(_) => false,
            ChurchHubError::Redis(_) => true,
            ChurchHubError::Serialization(_) => false,
            ChurchHubError::Io(_) => true,
            ChurchHubError::RateLimitExceeded => true,
            ChurchHubError::InvalidInput(_) => false,
            ChurchHubError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChurchHubError::Database(_) => ErrorSeverity::Critical,
            ChurchHubError::Migration(_) => ErrorSeverity::Critical,
            ChurchHubError::Config(_) => ErrorSeverity::Critical,
            ChurchHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            ChurchHubError::RateLimitExceeded => ErrorSeverity::Warning,
            ChurchHubError::Conflict(_) => ErrorSeverity::Info,
            ChurchHubError::InvalidInput(_) => ErrorSeverity::Info,
            ChurchHubError::Import(_) => ErrorSeverity::Info,
            ChurchHubError::MemberNotFound { .. }
            | ChurchHubError::GroupNotFound { .. }
            | ChurchHubError::EventNotFound { .. }
            | ChurchHubError::DonationNotFound { .. }
            | ChurchHubError::ImportJobNotFound { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// Whether the error was caused by a unique constraint violation in the store
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ChurchHubError::Database(sqlx::Error::Database(db_error)) => {
                db_error.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_error_converts_into_app_error() {
        let error: ChurchHubError = ImportError::EmptyFile.into();
        assert!(matches!(error, ChurchHubError::Import(ImportError::EmptyFile)));
        assert_eq!(error.severity(), ErrorSeverity::Info);
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Critical.to_string(), "CRITICAL");
        assert_eq!(ChurchHubError::RateLimitExceeded.severity(), ErrorSeverity::Warning);
        assert!(ChurchHubError::RateLimitExceeded.is_recoverable());
    }

    #[test]
    fn test_required_field_message() {
        let error = ImportError::RequiredFieldUnmapped(MemberField::LastName);
        assert_eq!(error.to_string(), "Required field is not mapped to any column: surname");
    }
}
