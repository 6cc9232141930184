//! Bulk member import
//!
//! Upload → [`parse_upload`] → [`ColumnMapping`] → row validation →
//! [`ImportPipeline`] upserts through a [`MemberStore`] while reporting
//! [`ImportProgress`] to a [`ProgressSink`].

pub mod ingest;
pub mod mapping;
pub mod validate;
pub mod progress;
pub mod pipeline;
pub mod store;
pub mod memory_store;

pub use ingest::{parse_upload, FileFormat, SheetTable};
pub use mapping::{guess_field, ColumnMapping, MemberField};
pub use validate::{validate_row, MemberDraft, RowError, ValidMember};
pub use progress::{ImportProgress, ImportSummary, NoProgress, ProgressSink, RowFailure};
pub use pipeline::{ImportOptions, ImportPipeline, UpsertOutcome};
pub use store::{MemberRecord, MemberStore};
pub use memory_store::MemoryStore;
