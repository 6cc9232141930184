//! Bulk import behaviour against the in-process member store

mod helpers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use tokio::sync::watch;

use helpers::*;
use ChurchHub::export::render_members_csv;
use ChurchHub::import::{
    parse_upload, ColumnMapping, ImportOptions, ImportPipeline, ImportProgress, ImportSummary,
    MemberField, MemberStore, MemoryStore, NoProgress, RowFailure,
};
use ChurchHub::utils::errors::{ChurchHubError, ImportError};

fn pipeline(store: Arc<MemoryStore>) -> ImportPipeline<Arc<MemoryStore>> {
    ImportPipeline::new(store, ImportOptions::default())
}

async fn import_csv(store: Arc<MemoryStore>, bytes: &[u8]) -> ImportSummary {
    let table = parse_upload("members.csv", bytes).expect("parse upload");
    let mapping = ColumnMapping::auto_map(&table.headers);
    pipeline(store)
        .run(&table, &mapping, &NoProgress)
        .await
        .expect("import runs")
}

#[tokio::test]
async fn test_rows_missing_name_or_surname_are_never_written() {
    let store = Arc::new(MemoryStore::new());
    let rows = vec![
        TestMember::new("Ada", "Lovelace").with_email("ada@example.org"),
        TestMember::new("", "Nameless").with_email("nameless@example.org"),
        TestMember::new("Surnameless", "   ").with_email("surnameless@example.org"),
        TestMember::new("Grace", "Hopper"),
    ];

    let summary = import_csv(store.clone(), &members_csv(&rows)).await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 2);
    assert_eq!(
        summary.failures,
        vec![
            RowFailure { row: 2, reason: "Missing required field: name".to_string() },
            RowFailure { row: 3, reason: "Missing required field: surname".to_string() },
        ]
    );

    let emails: Vec<String> = store.members().await.into_iter().map(|m| m.email).collect();
    assert_eq!(emails, vec!["ada@example.org", "grace.hopper@church.local"]);
}

#[tokio::test]
async fn test_matching_email_updates_instead_of_inserting() {
    let store = Arc::new(MemoryStore::new());
    let first = vec![TestMember::new("Ada", "Byron").with_email("ada@example.org").with_role("member")];
    let second = vec![
        TestMember::new("Ada", "Lovelace")
            .with_email("ada@example.org")
            .with_phone("555-0101")
            .with_role("leader"),
    ];

    let summary = import_csv(store.clone(), &members_csv(&first)).await;
    assert_eq!(summary.imported, 1);

    let summary = import_csv(store.clone(), &members_csv(&second)).await;
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.updated, 1);

    let members = store.members().await;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].last_name, "Lovelace");
    assert_eq!(members[0].phone.as_deref(), Some("555-0101"));
    assert_eq!(members[0].role, "leader");
}

#[tokio::test]
async fn test_rows_without_email_match_on_synthetic_address() {
    let store = Arc::new(MemoryStore::new());
    let rows = vec![TestMember::new("Mary Ann", "Smith")];

    import_csv(store.clone(), &members_csv(&rows)).await;
    let summary = import_csv(store.clone(), &members_csv(&rows)).await;

    assert_eq!(summary.updated, 1);
    assert_eq!(store.member_count().await, 1);
    assert_eq!(store.members().await[0].email, "maryann.smith@church.local");
}

#[tokio::test]
async fn test_export_then_reimport_round_trips_csv_text() {
    let source = Arc::new(MemoryStore::new());
    source.add_group("Youth Cell").await;
    source.add_group("Worship Team").await;

    let mut rows: Vec<TestMember> = (0..12).map(|_| TestMember::fake()).collect();
    rows[0] = rows[0].clone().with_group("Youth Cell").with_role("leader");
    rows[1] = rows[1].clone().with_group("Worship Team");
    rows[2].phone = None;
    import_csv(source.clone(), &members_csv(&rows)).await;

    let exported = members_csv_text(&source).await;

    let target = Arc::new(MemoryStore::new());
    target.add_group("Youth Cell").await;
    target.add_group("Worship Team").await;
    let summary = import_csv(target.clone(), exported.as_bytes()).await;
    assert_eq!(summary.errors, 0);

    assert_eq!(members_csv_text(&target).await, exported);
}

async fn members_csv_text(store: &Arc<MemoryStore>) -> String {
    ChurchHub::export::members_csv(store.as_ref()).await.expect("export members")
}

#[tokio::test]
async fn test_xlsx_upload_imports_like_csv() {
    let store = Arc::new(MemoryStore::new());
    let rows = vec![
        TestMember::new("Ada", "Lovelace").with_email("ada@example.org").with_phone("555-0101"),
        TestMember::new("Grace", "Hopper").with_email("grace@example.org"),
    ];

    let table = parse_upload("members.xlsx", &members_xlsx(&rows)).expect("parse workbook");
    let mapping = ColumnMapping::auto_map(&table.headers);
    let summary = pipeline(store.clone()).run(&table, &mapping, &NoProgress).await.unwrap();

    assert_eq!(summary.imported, 2);
    let records = render_members_csv(&store.list_member_records().await.unwrap()).unwrap();
    assert!(records.contains("Ada,Lovelace,ada@example.org,555-0101,,member"));
}

#[tokio::test]
async fn test_unknown_group_leaves_member_unassigned() {
    let store = Arc::new(MemoryStore::new());
    let youth = store.add_group("Youth Cell").await;
    let rows = vec![
        TestMember::new("Ada", "Lovelace").with_group("Youth Cell"),
        TestMember::new("Grace", "Hopper").with_group("Choir"),
    ];

    let summary = import_csv(store.clone(), &members_csv(&rows)).await;
    assert_eq!(summary.imported, 2);

    let members = store.members().await;
    assert_eq!(members[0].cell_group_id, Some(youth.id));
    assert_eq!(members[1].cell_group_id, None);
}

#[tokio::test]
async fn test_write_failure_is_counted_and_later_rows_continue() {
    let store = Arc::new(MemoryStore::new());
    store.fail_writes_for("broken@example.org").await;
    let rows = vec![
        TestMember::new("Ada", "Lovelace").with_email("ada@example.org"),
        TestMember::new("Broken", "Row").with_email("broken@example.org"),
        TestMember::new("Grace", "Hopper").with_email("grace@example.org"),
    ];

    let summary = import_csv(store.clone(), &members_csv(&rows)).await;

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.failures[0].row, 2);
    assert!(summary.failures[0].reason.starts_with("Failed to save member"));
    assert_eq!(store.member_count().await, 2);
}

#[tokio::test]
async fn test_progress_reaches_total() {
    let store = Arc::new(MemoryStore::new());
    let rows: Vec<TestMember> = (0..5).map(|_| TestMember::fake()).collect();
    let table = parse_upload("members.csv", &members_csv(&rows)).unwrap();
    let mapping = ColumnMapping::auto_map(&table.headers);

    let (sender, receiver) = watch::channel(ImportProgress::new(0, table.len()));
    let summary = pipeline(store).run(&table, &mapping, &sender).await.unwrap();

    let last = *receiver.borrow();
    assert_eq!(last, ImportProgress::new(5, 5));
    assert_eq!(last.percent, 100);
    assert_eq!(summary.processed(), 5);
}

#[tokio::test]
async fn test_row_delay_paces_without_losing_progress() {
    let store = Arc::new(MemoryStore::new());
    let rows: Vec<TestMember> = (0..3).map(|_| TestMember::fake()).collect();
    let table = parse_upload("members.csv", &members_csv(&rows)).unwrap();
    let mapping = ColumnMapping::auto_map(&table.headers);
    let options = ImportOptions {
        row_delay: Duration::from_millis(5),
        ..ImportOptions::default()
    };

    let (sender, receiver) = watch::channel(ImportProgress::new(0, table.len()));
    let started = Instant::now();
    let summary = ImportPipeline::new(store.clone(), options)
        .run(&table, &mapping, &sender)
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(15));
    assert_eq!(receiver.borrow().percent, 100);
    assert_eq!(summary.imported, 3);
    assert_eq!(store.member_count().await, 3);
}

#[tokio::test]
async fn test_unmapped_surname_fails_before_any_write() {
    let store = Arc::new(MemoryStore::new());
    let table = parse_upload("members.csv", b"Name,Email\nAda,ada@example.org\n").unwrap();
    let mapping = ColumnMapping::auto_map(&table.headers);
    assert_eq!(mapping.missing_required(), vec![MemberField::LastName]);

    let result = pipeline(store.clone()).run(&table, &mapping, &NoProgress).await;

    assert_matches!(
        result,
        Err(ChurchHubError::Import(ImportError::RequiredFieldUnmapped(MemberField::LastName)))
    );
    assert_eq!(store.member_count().await, 0);
}

#[tokio::test]
async fn test_header_only_file_imports_nothing() {
    let store = Arc::new(MemoryStore::new());
    let summary = import_csv(store.clone(), b"Name,Surname,Email\n").await;

    assert_eq!(summary.total, 0);
    assert_eq!(summary.processed(), 0);
    assert_eq!(store.member_count().await, 0);
}
