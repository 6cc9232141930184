//! Bulk member import
//!
//! Rows are validated, matched against existing members by email and
//! written one at a time. A failing row is counted and skipped; earlier
//! writes are kept.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::import::ingest::SheetTable;
use crate::import::mapping::ColumnMapping;
use crate::import::progress::{ImportProgress, ImportSummary, ProgressSink};
use crate::import::store::MemberStore;
use crate::import::validate::{validate_row, RowError, ValidMember};
use crate::models::{CreateMemberRequest, Member, UpdateMemberRequest};
use crate::utils::errors::Result;
use crate::utils::helpers::synthetic_email;
use crate::utils::logging::log_import_summary;

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub synthetic_email_domain: String,
    pub default_role: String,
    pub row_delay: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            synthetic_email_domain: "church.local".to_string(),
            default_role: "member".to_string(),
            row_delay: Duration::ZERO,
        }
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            synthetic_email_domain: config.synthetic_email_domain.clone(),
            default_role: config.default_role.clone(),
            row_delay: Duration::from_millis(config.row_delay_ms),
        }
    }
}

/// What happened to a valid row
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted(Member),
    Updated(Member),
}

pub struct ImportPipeline<S> {
    store: S,
    options: ImportOptions,
}

impl<S: MemberStore> ImportPipeline<S> {
    pub fn new(store: S, options: ImportOptions) -> Self {
        Self { store, options }
    }

    /// Import every data row of `table`. Fails up-front only when the
    /// mapping cannot drive the import; row problems land in the summary.
    pub async fn run(
        &self,
        table: &SheetTable,
        mapping: &ColumnMapping,
        progress: &dyn ProgressSink,
    ) -> Result<ImportSummary> {
        mapping.ensure_usable(table.width())?;

        let total = table.len();
        let mut summary = ImportSummary::new(total);
        let mut groups: HashMap<String, Option<i64>> = HashMap::new();

        if total == 0 {
            progress.report(ImportProgress::new(0, 0)).await;
        }

        for (index, row) in table.rows.iter().enumerate() {
            let row_number = index + 1;

            match validate_row(row, mapping) {
                Ok(member) => match self.upsert(member, &mut groups).await {
                    Ok(UpsertOutcome::Inserted(_)) => summary.imported += 1,
                    Ok(UpsertOutcome::Updated(_)) => summary.updated += 1,
                    Err(e) => {
                        warn!(row = row_number, error = %e, "Failed to write imported member");
                        summary.record_failure(row_number, RowError::WriteFailed(e.to_string()));
                    }
                },
                Err(e) => {
                    debug!(row = row_number, reason = %e, "Skipping invalid import row");
                    summary.record_failure(row_number, e);
                }
            }

            progress.report(ImportProgress::new(row_number, total)).await;

            if !self.options.row_delay.is_zero() {
                tokio::time::sleep(self.options.row_delay).await;
            }
        }

        log_import_summary(&summary);
        Ok(summary)
    }

    /// Insert a new member or update the one with the same email.
    ///
    /// The lookup and the write are separate store calls. If another import
    /// inserts the same new email in between, the insert hits the unique
    /// constraint and the row is reported as a write failure, not an update.
    pub async fn upsert(
        &self,
        member: ValidMember,
        groups: &mut HashMap<String, Option<i64>>,
    ) -> Result<UpsertOutcome> {
        let cell_group_id = match member.cell_group.as_deref() {
            Some(name) => self.resolve_group(name, groups).await?,
            None => None,
        };

        let email = member.email.clone().unwrap_or_else(|| {
            synthetic_email(&member.first_name, &member.last_name, &self.options.synthetic_email_domain)
        });

        match self.store.find_member_by_email(&email).await? {
            Some(existing) => {
                let request = UpdateMemberRequest {
                    first_name: Some(member.first_name),
                    last_name: Some(member.last_name),
                    phone: member.phone,
                    role: member.role,
                    cell_group_id,
                    ..Default::default()
                };
                let updated = self.store.update_member(existing.id, request).await?;
                Ok(UpsertOutcome::Updated(updated))
            }
            None => {
                let request = CreateMemberRequest {
                    first_name: member.first_name,
                    last_name: member.last_name,
                    email,
                    phone: member.phone,
                    role: Some(member.role.unwrap_or_else(|| self.options.default_role.clone())),
                    permissions: None,
                    cell_group_id,
                };
                let inserted = self.store.insert_member(request).await?;
                Ok(UpsertOutcome::Inserted(inserted))
            }
        }
    }

    async fn resolve_group(
        &self,
        name: &str,
        groups: &mut HashMap<String, Option<i64>>,
    ) -> Result<Option<i64>> {
        if let Some(id) = groups.get(name) {
            return Ok(*id);
        }

        let id = self.store.find_group_by_name(name).await?.map(|group| group.id);
        if id.is_none() {
            warn!(group = name, "Unknown group in import; leaving member unassigned");
        }

        groups.insert(name.to_string(), id);
        Ok(id)
    }
}
