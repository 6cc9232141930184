//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ChurchHub application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::import::{ImportProgress, ImportSummary};
use crate::utils::errors::{ChurchHubError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "churchhub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(stdout_layer)
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| ChurchHubError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log member directory actions with structured data
pub fn log_member_action(member_id: i64, action: &str, details: Option<&str>) {
    info!(
        member_id = member_id,
        action = action,
        details = details,
        "Member action performed"
    );
}

/// Log group events
pub fn log_group_event(group_id: i64, event: &str, member_id: Option<i64>) {
    info!(
        group_id = group_id,
        event = event,
        member_id = member_id,
        "Group event occurred"
    );
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, member_id: Option<i64>) {
    info!(
        event_id = event_id,
        action = action,
        member_id = member_id,
        "Event action performed"
    );
}

/// Log import progress
pub fn log_import_progress(progress: &ImportProgress) {
    debug!(
        processed = progress.processed,
        total = progress.total,
        percent = progress.percent,
        "Import progress"
    );
}

/// Log the final tally of an import run
pub fn log_import_summary(summary: &ImportSummary) {
    if summary.errors > 0 {
        warn!(
            total = summary.total,
            imported = summary.imported,
            updated = summary.updated,
            errors = summary.errors,
            "Member import finished with errors"
        );
    } else {
        info!(
            total = summary.total,
            imported = summary.imported,
            updated = summary.updated,
            "Member import finished"
        );
    }
}

/// Log admin actions
pub fn log_admin_action(actor: Option<&str>, action: &str, target: Option<&str>) {
    warn!(
        actor = actor,
        action = action,
        target = target,
        "Admin action performed"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
