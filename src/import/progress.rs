//! Import progress and outcome reporting

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;


/// Rows processed so far out of the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ImportProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            (processed.min(total) * 100 / total) as u8
        };

        Self { processed, total, percent }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// One skipped row; `row` counts data rows from 1, header excluded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row: usize,
    pub reason: String,
}

/// Outcome of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    pub updated: usize,
    pub errors: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    pub fn new(total: usize) -> Self {
        Self { total, ..Default::default() }
    }

    pub fn record_failure(&mut self, row: usize, reason: impl ToString) {
        self.errors += 1;
        self.failures.push(RowFailure { row, reason: reason.to_string() });
    }

    pub fn processed(&self) -> usize {
        self.imported + self.updated + self.errors
    }
}

/// Receives a progress update after every row
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, progress: ImportProgress);
}

/// Discards progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

#[async_trait]
impl ProgressSink for NoProgress {
    async fn report(&self, _progress: ImportProgress) {}
}

#[async_trait]
impl ProgressSink for watch::Sender<ImportProgress> {
    async fn report(&self, progress: ImportProgress) {
        self.send_replace(progress);
    }
}
