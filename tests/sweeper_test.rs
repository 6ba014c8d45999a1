//! Retention sweep tests: cutoff selection, retain pinning, tombstones,
//! and crash-recovery via idempotent blob deletion.

mod common;

use bytes::Bytes;
use chrono::{Duration, Utc};

use filedock_core::error::ErrorKind;
use filedock_database::store::VersionIndex;
use filedock_service::file::content::VersionSelector;

use common::TestEngine;

#[tokio::test]
async fn test_old_versions_are_swept_new_ones_kept() {
    let engine = TestEngine::new().await;
    let file = engine.create_file("drawing.dwg", "rev one").await;

    // Produce version 2 today; backdate version 1 below the day boundary.
    engine
        .checkout
        .pull(&engine.ctx(engine.alice), engine.project_id, file.id, None, None)
        .await
        .unwrap();
    engine
        .checkout
        .push(
            &engine.ctx(engine.alice),
            engine.project_id,
            file.id,
            Bytes::from("rev two"),
            None,
        )
        .await
        .unwrap();
    engine.backdate_version(file.id, 1, 2).await;

    let report = engine.sweeper.run(0).await.unwrap();
    assert_eq!(report.scanned, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 0);

    // Version 1 is a tombstone: row kept, blob gone, reads as not-found.
    let v1 = engine.versions.find(file.id, 1).await.unwrap().unwrap();
    assert!(v1.deleted);
    let err = engine
        .read_content(file.id, VersionSelector::Number(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Version 2 was created today and survives a zero-day lifetime.
    let v2 = engine.versions.find(file.id, 2).await.unwrap().unwrap();
    assert!(!v2.deleted);
    assert_eq!(
        engine
            .read_content(file.id, VersionSelector::Latest)
            .await
            .unwrap(),
        b"rev two"
    );
}

#[tokio::test]
async fn test_retained_versions_are_never_swept() {
    let engine = TestEngine::new().await;
    let file = engine.create_file("milestone.step", "golden").await;

    engine
        .version_service
        .set_retain(&engine.ctx(engine.alice), engine.project_id, file.id, 1, true)
        .await
        .unwrap();
    engine.backdate_version(file.id, 1, 365).await;

    let report = engine.sweeper.run(0).await.unwrap();
    assert_eq!(report.scanned, 0);

    assert_eq!(
        engine
            .read_content(file.id, VersionSelector::Number(1))
            .await
            .unwrap(),
        b"golden"
    );

    // Un-pinning makes it sweepable again.
    engine
        .version_service
        .set_retain(&engine.ctx(engine.alice), engine.project_id, file.id, 1, false)
        .await
        .unwrap();
    let report = engine.sweeper.run(0).await.unwrap();
    assert_eq!(report.deleted, 1);
}

#[tokio::test]
async fn test_versions_inside_lifetime_are_kept() {
    let engine = TestEngine::new().await;
    let file = engine.create_file("fresh.txt", "young").await;
    engine.backdate_version(file.id, 1, 5).await;

    // Five days old, thirty-day lifetime: not a candidate.
    let report = engine.sweeper.run(30).await.unwrap();
    assert_eq!(report.scanned, 0);

    // With a three-day lifetime it goes.
    let report = engine.sweeper.run(3).await.unwrap();
    assert_eq!(report.deleted, 1);
}

#[tokio::test]
async fn test_sweep_recovers_from_lost_tombstone() {
    let engine = TestEngine::new().await;
    let file = engine.create_file("crashy.txt", "x").await;
    engine.backdate_version(file.id, 1, 2).await;

    // Simulate a crash between blob delete and tombstone write: the blob is
    // already gone but the row still reads "not deleted".
    engine
        .store
        .delete_version(engine.project_id, file.id, 1)
        .await
        .unwrap();
    let v1 = engine.versions.find(file.id, 1).await.unwrap().unwrap();
    assert!(!v1.deleted);

    // The next run re-deletes the absent blob (a no-op) and completes the
    // tombstone.
    let report = engine.sweeper.run(0).await.unwrap();
    assert_eq!(report.deleted, 1);
    assert_eq!(report.failed, 0);
    let v1 = engine.versions.find(file.id, 1).await.unwrap().unwrap();
    assert!(v1.deleted);
}

#[tokio::test]
async fn test_swept_versions_are_not_rescanned() {
    let engine = TestEngine::new().await;
    let file = engine.create_file("once.txt", "x").await;
    engine.backdate_version(file.id, 1, 2).await;

    assert_eq!(engine.sweeper.run(0).await.unwrap().deleted, 1);
    // Tombstoned rows fall out of the candidate set.
    assert_eq!(engine.sweeper.run(0).await.unwrap().scanned, 0);
}

#[tokio::test]
async fn test_full_lifecycle_scenario() {
    let engine = TestEngine::new().await;

    // File created (version 1).
    let file = engine.create_file("assembly.step", "rev one").await;

    // User A pulls with estComplete = T+1d.
    engine
        .checkout
        .pull(
            &engine.ctx(engine.alice),
            engine.project_id,
            file.id,
            Some(Utc::now() + Duration::days(1)),
            None,
        )
        .await
        .unwrap();

    // User B attempts push -> NotPulled.
    let err = engine
        .checkout
        .push(
            &engine.ctx(engine.bob),
            engine.project_id,
            file.id,
            Bytes::from("rev two (bob)"),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotPulled);

    // User A pushes new content -> version 2, file free again.
    engine
        .checkout
        .push(
            &engine.ctx(engine.alice),
            engine.project_id,
            file.id,
            Bytes::from("rev two"),
            None,
        )
        .await
        .unwrap();

    // Sweep with lifetime 0: version 1 (backdated past the boundary, not
    // retained) is deleted; version 2 is too new.
    engine.backdate_version(file.id, 1, 1).await;
    let report = engine.sweeper.run(0).await.unwrap();
    assert_eq!(report.deleted, 1);

    assert!(engine.versions.find(file.id, 1).await.unwrap().unwrap().deleted);
    assert!(!engine.versions.find(file.id, 2).await.unwrap().unwrap().deleted);
    assert_eq!(
        engine
            .read_content(file.id, VersionSelector::Latest)
            .await
            .unwrap(),
        b"rev two"
    );
}
