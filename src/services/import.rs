//! Import job service
//!
//! Runs each bulk import as one background task and keeps a snapshot of
//! its progress that the dashboard polls. Snapshots live in process memory
//! and, when Redis is enabled, are mirrored there with a TTL. Finished jobs
//! are dropped from memory once the same retention window has passed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::database::AdminRepository;
use crate::import::{
    ColumnMapping, ImportOptions, ImportPipeline, ImportProgress, ImportSummary, MemberField,
    MemberStore, ProgressSink, SheetTable,
};
use crate::models::{ActivityKind, RecordActivityRequest};
use crate::services::redis::RedisService;
use crate::utils::errors::{ChurchHubError, Result};
use crate::utils::logging::{log_admin_action, log_import_progress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Latest known state of an import run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub file_name: String,
    pub status: JobStatus,
    pub progress: ImportProgress,
    pub summary: Option<ImportSummary>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// What the dashboard shows before committing an import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub headers: Vec<String>,
    pub mapping: ColumnMapping,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub missing_required: Vec<MemberField>,
}

impl ImportPreview {
    pub fn new(table: &SheetTable, preview_rows: usize) -> Self {
        let mapping = ColumnMapping::auto_map(&table.headers);
        Self {
            headers: table.headers.clone(),
            missing_required: mapping.missing_required(),
            mapping,
            rows: table.preview(preview_rows).to_vec(),
            total_rows: table.len(),
        }
    }
}

type JobTable = Arc<RwLock<HashMap<Uuid, ImportJob>>>;

/// Matches the default Redis TTL
pub const DEFAULT_JOB_RETENTION_SECS: i64 = 3600;

#[derive(Clone)]
struct JobSnapshots {
    jobs: JobTable,
    redis: Option<RedisService>,
    retention: Duration,
}

/// Drop jobs that finished more than `retention` before `now`; running
/// jobs are always kept. Returns how many were removed.
fn evict_finished(jobs: &mut HashMap<Uuid, ImportJob>, now: DateTime<Utc>, retention: Duration) -> usize {
    let before = jobs.len();
    jobs.retain(|_, job| match job.finished_at {
        Some(finished_at) => finished_at + retention > now,
        None => true,
    });
    before - jobs.len()
}

impl JobSnapshots {
    async fn store(&self, job: &ImportJob) {
        {
            let mut jobs = self.jobs.write().await;
            let evicted = evict_finished(&mut jobs, Utc::now(), self.retention);
            if evicted > 0 {
                debug!(evicted, retained = jobs.len(), "Evicted finished import jobs");
            }
            jobs.insert(job.id, job.clone());
        }

        if let Some(redis) = &self.redis {
            if let Err(e) = redis.set(&job_key(job.id), job, None).await {
                warn!(job_id = %job.id, error = %e, "Failed to mirror import job to Redis");
            }
        }
    }

    async fn update<F>(&self, id: Uuid, apply: F)
    where
        F: FnOnce(&mut ImportJob),
    {
        let snapshot = {
            let mut jobs = self.jobs.write().await;
            match jobs.get_mut(&id) {
                Some(job) => {
                    apply(job);
                    job.clone()
                }
                None => return,
            }
        };

        if let Some(redis) = &self.redis {
            if let Err(e) = redis.set(&job_key(id), &snapshot, None).await {
                warn!(job_id = %id, error = %e, "Failed to mirror import job to Redis");
            }
        }
    }
}

fn job_key(id: Uuid) -> String {
    format!("import:{}", id)
}

struct JobProgressSink {
    id: Uuid,
    snapshots: JobSnapshots,
}

#[async_trait]
impl ProgressSink for JobProgressSink {
    async fn report(&self, progress: ImportProgress) {
        log_import_progress(&progress);
        self.snapshots
            .update(self.id, |job| job.progress = progress)
            .await;
    }
}

/// Starts import jobs and answers progress queries
#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn MemberStore>,
    options: ImportOptions,
    snapshots: JobSnapshots,
    activity: Option<AdminRepository>,
}

impl ImportService {
    pub fn new(
        store: Arc<dyn MemberStore>,
        options: ImportOptions,
        redis: Option<RedisService>,
        activity: Option<AdminRepository>,
    ) -> Self {
        Self {
            store,
            options,
            snapshots: JobSnapshots {
                jobs: Arc::new(RwLock::new(HashMap::new())),
                redis,
                retention: Duration::seconds(DEFAULT_JOB_RETENTION_SECS),
            },
            activity,
        }
    }

    /// How long finished jobs stay queryable from memory
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.snapshots.retention = retention;
        self
    }

    /// Validate the mapping and spawn the import; returns the job id at once
    pub async fn start(
        &self,
        file_name: String,
        table: SheetTable,
        mapping: ColumnMapping,
        actor: Option<String>,
    ) -> Result<Uuid> {
        mapping.ensure_usable(table.width())?;

        let id = Uuid::new_v4();
        let job = ImportJob {
            id,
            file_name: file_name.clone(),
            status: JobStatus::Running,
            progress: ImportProgress::new(0, table.len()),
            summary: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.snapshots.store(&job).await;
        info!(job_id = %id, file = %file_name, rows = table.len(), "Import job started");

        let service = self.clone();
        tokio::spawn(async move {
            service.execute(id, file_name, table, mapping, actor).await;
        });

        Ok(id)
    }

    async fn execute(
        &self,
        id: Uuid,
        file_name: String,
        table: SheetTable,
        mapping: ColumnMapping,
        actor: Option<String>,
    ) {
        let pipeline = ImportPipeline::new(self.store.clone(), self.options.clone());
        let sink = JobProgressSink {
            id,
            snapshots: self.snapshots.clone(),
        };

        match pipeline.run(&table, &mapping, &sink).await {
            Ok(summary) => {
                self.record_activity(actor.as_deref(), &file_name, &summary).await;
                self.snapshots
                    .update(id, |job| {
                        job.status = JobStatus::Completed;
                        job.progress = ImportProgress::new(summary.total, summary.total);
                        job.summary = Some(summary);
                        job.finished_at = Some(Utc::now());
                    })
                    .await;
            }
            Err(e) => {
                error!(job_id = %id, error = %e, "Import job failed");
                self.snapshots
                    .update(id, |job| {
                        job.status = JobStatus::Failed;
                        job.error = Some(e.to_string());
                        job.finished_at = Some(Utc::now());
                    })
                    .await;
            }
        }
    }

    async fn record_activity(&self, actor: Option<&str>, file_name: &str, summary: &ImportSummary) {
        log_admin_action(actor, "bulk_import", Some(file_name));

        let Some(activity) = &self.activity else { return };
        let request = RecordActivityRequest {
            actor: actor.map(str::to_string),
            action: format!(
                "Imported {} ({} new, {} updated, {} errors)",
                file_name, summary.imported, summary.updated, summary.errors
            ),
            kind: if summary.errors > 0 { ActivityKind::Warning } else { ActivityKind::Success },
            details: serde_json::to_value(summary).ok(),
        };

        if let Err(e) = activity.record_activity(request).await {
            warn!(error = %e, "Failed to record import activity");
        }
    }

    /// Latest snapshot of a job
    pub async fn status(&self, id: Uuid) -> Result<ImportJob> {
        if let Some(job) = self.snapshots.jobs.read().await.get(&id) {
            return Ok(job.clone());
        }

        if let Some(redis) = &self.snapshots.redis {
            if let Some(job) = redis.get::<ImportJob>(&job_key(id)).await? {
                return Ok(job);
            }
        }

        Err(ChurchHubError::ImportJobNotFound { job_id: id })
    }

    /// Block until a job leaves the running state
    pub async fn wait(&self, id: Uuid) -> Result<ImportJob> {
        loop {
            let job = self.status(id).await?;
            if job.status != JobStatus::Running {
                return Ok(job);
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{parse_upload, MemoryStore};
    use assert_matches::assert_matches;

    fn service(store: Arc<MemoryStore>) -> ImportService {
        ImportService::new(store, ImportOptions::default(), None, None)
    }

    #[tokio::test]
    async fn test_job_runs_to_completion() {
        let store = Arc::new(MemoryStore::new());
        let service = service(store.clone());
        let table = parse_upload("m.csv", b"Name,Surname\nAda,Lovelace\n,Nobody\n").unwrap();
        let mapping = ColumnMapping::auto_map(&table.headers);

        let id = service.start("m.csv".to_string(), table, mapping, None).await.unwrap();
        let job = service.wait(id).await.unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress.percent, 100);
        let summary = job.summary.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(store.member_count().await, 1);
    }

    #[tokio::test]
    async fn test_unusable_mapping_rejected_up_front() {
        let service = service(Arc::new(MemoryStore::new()));
        let table = parse_upload("m.csv", b"Name,Email\nAda,a@b.c\n").unwrap();
        let mapping = ColumnMapping::auto_map(&table.headers);

        assert_matches!(
            service.start("m.csv".to_string(), table, mapping, None).await,
            Err(ChurchHubError::Import(_))
        );
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let service = service(Arc::new(MemoryStore::new()));
        assert_matches!(
            service.status(Uuid::new_v4()).await,
            Err(ChurchHubError::ImportJobNotFound { .. })
        );
    }

    fn finished_job(finished_at: Option<DateTime<Utc>>) -> ImportJob {
        ImportJob {
            id: Uuid::new_v4(),
            file_name: "m.csv".to_string(),
            status: if finished_at.is_some() { JobStatus::Completed } else { JobStatus::Running },
            progress: ImportProgress::new(0, 0),
            summary: None,
            error: None,
            started_at: Utc::now(),
            finished_at,
        }
    }

    #[test]
    fn test_evict_finished_after_retention() {
        let now = Utc::now();
        let retention = Duration::minutes(10);
        let fresh = finished_job(Some(now - Duration::minutes(5)));
        let stale = finished_job(Some(now - Duration::minutes(11)));
        let running = finished_job(None);

        let mut jobs: HashMap<Uuid, ImportJob> = [&fresh, &stale, &running]
            .into_iter()
            .map(|job| (job.id, job.clone()))
            .collect();

        assert_eq!(evict_finished(&mut jobs, now, retention), 1);
        assert!(jobs.contains_key(&fresh.id));
        assert!(jobs.contains_key(&running.id));
        assert!(!jobs.contains_key(&stale.id));

        // once the window passes the fresh one goes too, the running one never does
        assert_eq!(evict_finished(&mut jobs, now + Duration::minutes(6), retention), 1);
        assert_eq!(jobs.keys().collect::<Vec<_>>(), vec![&running.id]);
    }

    #[tokio::test]
    async fn test_finished_jobs_do_not_accumulate() {
        let service = service(Arc::new(MemoryStore::new())).with_retention(Duration::zero());
        let mut finished = Vec::new();

        for i in 0..20 {
            let csv = format!("Name,Surname\nMember,Number{}\n", i);
            let table = parse_upload("m.csv", csv.as_bytes()).unwrap();
            let mapping = ColumnMapping::auto_map(&table.headers);
            let id = service.start("m.csv".to_string(), table, mapping, None).await.unwrap();
            service.wait(id).await.unwrap();
            finished.push(id);
        }

        // each start evicts the jobs finished before it
        assert!(service.snapshots.jobs.read().await.len() <= 1);
        assert_matches!(
            service.status(finished[0]).await,
            Err(ChurchHubError::ImportJobNotFound { .. })
        );
    }

    #[test]
    fn test_preview() {
        let table = parse_upload("m.csv", b"First,Email\nAda,a@b.c\nAlan,t@b.c\n").unwrap();
        let preview = ImportPreview::new(&table, 1);

        assert_eq!(preview.rows.len(), 1);
        assert_eq!(preview.total_rows, 2);
        assert_eq!(preview.missing_required, vec![MemberField::LastName]);
    }
}
