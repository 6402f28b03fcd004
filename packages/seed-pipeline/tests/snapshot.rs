//! Snapshot files on disk.

use seed_pipeline::error::PersistenceError;
use seed_pipeline::testing::sample_raw_record;
use seed_pipeline::{RawRecord, SnapshotKind, SnapshotStore};

#[tokio::test]
async fn test_latest_picks_newest_of_kind() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path());

    store
        .write(SnapshotKind::Raw, "20240101T000000", &[sample_raw_record("old")])
        .await
        .unwrap();
    store
        .write(SnapshotKind::Raw, "20240301T000000", &[sample_raw_record("new")])
        .await
        .unwrap();
    store
        .write(SnapshotKind::Raw, "20240201T000000", &[sample_raw_record("middle")])
        .await
        .unwrap();
    store
        .write::<RawRecord>(SnapshotKind::Enriched, "20250101T000000", &[])
        .await
        .unwrap();

    let (version, records) = store.read_latest::<RawRecord>(SnapshotKind::Raw).await.unwrap();

    assert_eq!(version, "20240301T000000");
    assert_eq!(records, vec![sample_raw_record("new")]);
}

#[tokio::test]
async fn test_missing_directory_has_no_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("does-not-exist"));

    assert!(store.latest(SnapshotKind::Enriched).await.unwrap().is_none());

    let error = store
        .read_latest::<RawRecord>(SnapshotKind::Enriched)
        .await
        .unwrap_err();
    assert!(matches!(error, PersistenceError::NotFound { ref kind, .. } if kind == "enriched"));
}

#[tokio::test]
async fn test_write_creates_directory_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::new(dir.path().join("data"));

    let path = store
        .write(SnapshotKind::FailedSeed, "1", &[sample_raw_record("x")])
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "failed-seed-1.json");
    let names: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["failed-seed-1.json"]);
}

#[tokio::test]
async fn test_corrupt_snapshot_is_a_json_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("raw-1.json"), b"[{").unwrap();
    let store = SnapshotStore::new(dir.path());

    let error = store.read_latest::<RawRecord>(SnapshotKind::Raw).await.unwrap_err();
    assert!(matches!(error, PersistenceError::Json { .. }));
}

#[tokio::test]
async fn test_raw_record_tolerates_missing_optional_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("raw-1.json"),
        br#"[{"identifier":"a","source_url":"https://a.dev/","short_title":"A","short_description":"d"}]"#,
    )
    .unwrap();
    let store = SnapshotStore::new(dir.path());

    let (_, records) = store.read_latest::<RawRecord>(SnapshotKind::Raw).await.unwrap();
    assert_eq!(records[0].extracted_text, "");
    assert_eq!(records[0].logo_url, "");
}
