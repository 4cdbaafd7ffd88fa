//! Integration tests for New, Changed and Deleted requests.

mod helpers;

use helpers::{ROOT, TestIndexer, varied};
use syncdesk_core::events::WithholdReason;
use syncdesk_core::traits::EncryptionContext;
use syncdesk_core::traits::crypto::REPOSITORY_CONTEXT;
use syncdesk_entity::file::{FileStatus, SyncStatus};
use syncdesk_index::{IndexOutcome, IndexRequest};
use syncdesk_storage::chunker::checksum;

#[tokio::test]
async fn test_new_file_creates_first_version() {
    let t = TestIndexer::new();
    let data = varied(3000, 7);

    let outcome = t.add_file("/report.pdf", &data).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 1, .. }));

    let v = t.get("/report.pdf").await;
    assert_eq!(v.version, 1);
    assert_eq!(v.status, FileStatus::New);
    assert_eq!(v.sync_status, SyncStatus::Local);
    assert_eq!(v.name, "report.pdf");
    assert_eq!(v.size, 3000);
    assert_eq!(v.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(v.chunks.len(), 3);
    assert_eq!(v.checksum.as_deref(), Some(checksum(&data).as_str()));
    assert_eq!(v.client_name, "test-desk");
    assert!(v.parent.is_none());

    let uploaded = t.uploaded();
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].key(), v.key());
}

#[tokio::test]
async fn test_identical_content_chunks_identically() {
    let t = TestIndexer::new();
    let data = varied(5000, 11);

    t.add_file("/a.bin", &data).await;
    t.add_file("/b.bin", &data).await;

    let a = t.get("/a.bin").await;
    let b = t.get("/b.bin").await;
    assert_ne!(a.file_id, b.file_id);
    assert_eq!(a.chunks, b.chunks);
    assert_eq!(a.checksum, b.checksum);

    // Dedup: the second file adds no chunk records and no blobs.
    assert_eq!(t.chunk_records().await, a.chunks.len());
    assert_eq!(t.blobs_in(REPOSITORY_CONTEXT), a.chunks.len());
}

#[tokio::test]
async fn test_concurrent_identical_files_store_one_blob_per_chunk() {
    let t = TestIndexer::new();
    let data = varied(4096, 3);
    t.write_file("/x.bin", &data);
    t.write_file("/y.bin", &data);

    let (x, y) = tokio::join!(
        t.process(IndexRequest::new_file(ROOT, "/x.bin")),
        t.process(IndexRequest::new_file(ROOT, "/y.bin")),
    );
    assert!(matches!(x, IndexOutcome::Indexed { .. }));
    assert!(matches!(y, IndexOutcome::Indexed { .. }));
    assert_eq!(t.blobs_in(REPOSITORY_CONTEXT), 4);
}

#[tokio::test]
async fn test_versions_are_gapless() {
    let t = TestIndexer::new();
    t.add_file("/notes.txt", b"one").await;
    let file_id = t.get("/notes.txt").await.file_id;

    for (i, body) in [&b"one two"[..], b"one two three", b"four"].iter().enumerate() {
        t.write_file("/notes.txt", body);
        let outcome = t.process(IndexRequest::changed(ROOT, "/notes.txt")).await;
        assert!(
            matches!(outcome, IndexOutcome::Indexed { version, .. } if version == i as u64 + 2),
            "unexpected outcome {outcome:?}"
        );
    }

    t.rename("/notes.txt", "/renamed.txt");
    t.process(IndexRequest::moved(ROOT, "/notes.txt", "/renamed.txt"))
        .await;

    assert_eq!(t.versions_of(file_id).await, vec![1, 2, 3, 4, 5]);
    let latest = t.get("/renamed.txt").await;
    assert_eq!(latest.file_id, file_id);
    assert_eq!(latest.status, FileStatus::Renamed);
}

#[tokio::test]
async fn test_changed_content_replaces_chunks() {
    let t = TestIndexer::new();
    t.add_file("/grow.bin", &varied(4000, 1)).await;
    assert_eq!(t.get("/grow.bin").await.chunks.len(), 4);

    let shorter = varied(1500, 2);
    t.write_file("/grow.bin", &shorter);
    t.process(IndexRequest::changed(ROOT, "/grow.bin")).await;

    let v = t.get("/grow.bin").await;
    assert_eq!(v.version, 2);
    assert_eq!(v.status, FileStatus::Changed);
    assert_eq!(v.chunks.len(), 2);
    assert_eq!(v.chunks[0].checksum, checksum(&shorter[..1024]));
    assert_eq!(v.checksum.as_deref(), Some(checksum(&shorter).as_str()));
}

#[tokio::test]
async fn test_quota_exceeded_is_withheld() {
    let t = TestIndexer::new();
    t.quota.update(10_000, 9_000);

    let outcome = t.add_file("/big.bin", &varied(2000, 5)).await;
    assert!(matches!(
        outcome,
        IndexOutcome::Withheld {
            version: 1,
            reason: WithholdReason::QuotaExceeded,
            ..
        }
    ));

    let v = t.get("/big.bin").await;
    assert_eq!(v.sync_status, SyncStatus::Unsync);
    assert!(v.chunks.is_empty());
    assert!(t.uploaded().is_empty());
    assert_eq!(t.chunk_records().await, 0);
}

#[tokio::test]
async fn test_quota_does_not_apply_to_folders() {
    let t = TestIndexer::new();
    t.quota.update(0, 0);

    let outcome = t.add_folder("/docs").await;
    assert!(matches!(outcome, IndexOutcome::Indexed { .. }));
    assert_eq!(t.uploaded().len(), 1);
}

#[tokio::test]
async fn test_illegal_name_is_withheld() {
    let t = TestIndexer::new();
    let outcome = t.add_file("/what?.txt", b"question").await;
    assert!(matches!(
        outcome,
        IndexOutcome::Withheld {
            reason: WithholdReason::IllegalName,
            ..
        }
    ));
    assert_eq!(t.get("/what?.txt").await.sync_status, SyncStatus::Unsync);
    assert!(t.uploaded().is_empty());
}

#[tokio::test]
async fn test_unsynced_first_version_collapses() {
    let t = TestIndexer::new();
    t.quota.update(100, 0);
    t.add_file("/draft.txt", &varied(500, 1)).await;
    let old = t.get("/draft.txt").await;
    assert!(old.is_withheld());

    t.quota.update(1 << 30, 0);
    t.write_file("/draft.txt", &varied(600, 2));
    let outcome = t.process(IndexRequest::changed(ROOT, "/draft.txt")).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 1, .. }));

    let new = t.get("/draft.txt").await;
    assert_ne!(new.file_id, old.file_id);
    assert_eq!(new.version, 1);
    assert_eq!(new.status, FileStatus::New);
    assert!(t.versions_of(old.file_id).await.is_empty());
}

#[tokio::test]
async fn test_unsynced_third_version_is_replaced_by_fourth() {
    let t = TestIndexer::new();
    t.add_file("/plan.txt", &varied(100, 1)).await;
    t.write_file("/plan.txt", &varied(200, 2));
    t.process(IndexRequest::changed(ROOT, "/plan.txt")).await;
    let file_id = t.get("/plan.txt").await.file_id;

    t.quota.update(250, 0);
    t.write_file("/plan.txt", &varied(300, 3));
    let outcome = t.process(IndexRequest::changed(ROOT, "/plan.txt")).await;
    assert!(matches!(outcome, IndexOutcome::Withheld { version: 3, .. }));

    t.quota.update(1 << 30, 0);
    let body = varied(1200, 4);
    t.write_file("/plan.txt", &body);
    let outcome = t.process(IndexRequest::changed(ROOT, "/plan.txt")).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 4, .. }));

    let v = t.get("/plan.txt").await;
    assert_eq!(v.file_id, file_id);
    assert_eq!(v.version, 4);
    assert_eq!(v.status, FileStatus::Changed);
    assert_eq!(v.chunks.len(), 2);
    assert_eq!(v.checksum.as_deref(), Some(checksum(&body).as_str()));
    assert_eq!(t.versions_of(file_id).await, vec![1, 2, 4]);
}

#[tokio::test]
async fn test_changed_without_prior_redispatches_as_new() {
    let t = TestIndexer::new();
    t.write_file("/late.txt", b"arrived late");

    let outcome = t.process(IndexRequest::changed(ROOT, "/late.txt")).await;
    assert_eq!(
        outcome,
        IndexOutcome::Redispatched(Box::new(IndexRequest::new_file(ROOT, "/late.txt")))
    );
    assert!(t.find("/late.txt").await.is_none());
}

#[tokio::test]
async fn test_missing_parent_defers_until_indexed() {
    let t = TestIndexer::new();
    t.write_file("/docs/a.txt", b"child first");

    let outcome = t.process(IndexRequest::new_file(ROOT, "/docs/a.txt")).await;
    assert_eq!(outcome, IndexOutcome::Deferred);
    assert!(t.find("/docs/a.txt").await.is_none());

    t.process(IndexRequest::new_file(ROOT, "/docs")).await;
    let outcome = t.process(IndexRequest::new_file(ROOT, "/docs/a.txt")).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { .. }));

    let folder = t.get("/docs").await;
    let child = t.get("/docs/a.txt").await;
    assert!(folder.is_folder);
    assert_eq!(child.parent, Some(folder.key()));
}

#[tokio::test]
async fn test_unchanged_file_is_skipped() {
    let t = TestIndexer::new();
    t.add_file("/same.txt", b"same").await;

    let outcome = t.process(IndexRequest::new_file(ROOT, "/same.txt")).await;
    assert_eq!(outcome, IndexOutcome::Skipped);
    assert_eq!(t.uploaded().len(), 1);
}

#[tokio::test]
async fn test_ignored_and_vanished_paths() {
    let t = TestIndexer::new();
    assert_eq!(t.add_file("/Thumbs.db", b"x").await, IndexOutcome::Ignored);
    assert_eq!(
        t.process(IndexRequest::new_file(ROOT, "/ghost.txt")).await,
        IndexOutcome::Vanished
    );
    assert!(t.find("/Thumbs.db").await.is_none());
}

#[tokio::test]
async fn test_workspace_files_use_workspace_context() {
    let t = TestIndexer::new();
    let workspace = t.register_workspace("/shared").await;
    t.add_folder("/shared").await;
    t.mkdir("/shared/sub");
    t.process(IndexRequest::new_file(ROOT, "/shared/sub")).await;
    t.add_file("/shared/sub/file.txt", b"team notes").await;
    t.add_file("/private.txt", b"my notes").await;

    let shared = t.get("/shared/sub/file.txt").await;
    assert_eq!(shared.workspace_id, Some(workspace));
    let context = EncryptionContext::workspace_id(&workspace);
    assert!(shared.chunks.iter().all(|c| c.context == context));
    assert_eq!(t.blobs_in(&context), 1);

    let private = t.get("/private.txt").await;
    assert!(private.workspace_id.is_none());
    assert!(private.chunks.iter().all(|c| c.context == REPOSITORY_CONTEXT));
}

#[tokio::test]
async fn test_delete_records_deleted_version() {
    let t = TestIndexer::new();
    t.add_file("/old.txt", b"bye").await;
    let file_id = t.get("/old.txt").await.file_id;

    t.remove("/old.txt");
    let outcome = t.process(IndexRequest::deleted(ROOT, "/old.txt")).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    assert!(t.find("/old.txt").await.is_none());
    assert_eq!(t.versions_of(file_id).await, vec![1, 2]);
    let last = t.uploaded().pop().expect("deletion queued");
    assert_eq!(last.status, FileStatus::Deleted);
    assert!(last.chunks.is_empty());
}

#[tokio::test]
async fn test_delete_of_unsynced_first_version_removes_it() {
    let t = TestIndexer::new();
    t.add_file("/bad|name.txt", b"never synced").await;
    let file_id = t.get("/bad|name.txt").await.file_id;

    t.remove("/bad|name.txt");
    let outcome = t.process(IndexRequest::deleted(ROOT, "/bad|name.txt")).await;
    assert_eq!(outcome, IndexOutcome::Removed { file_id });
    assert!(t.versions_of(file_id).await.is_empty());
    assert!(t.uploaded().is_empty());
}

#[tokio::test]
async fn test_delete_of_folder_deletes_contents() {
    let t = TestIndexer::new();
    t.add_folder("/docs").await;
    t.add_file("/docs/a.txt", b"a").await;
    t.add_folder("/docs/sub").await;
    t.add_file("/docs/sub/b.txt", b"bb").await;

    t.remove("/docs");
    t.process(IndexRequest::deleted(ROOT, "/docs")).await;

    for path in ["/docs", "/docs/a.txt", "/docs/sub", "/docs/sub/b.txt"] {
        assert!(t.find(path).await.is_none(), "{path} still live");
    }
    let deleted = t
        .uploaded()
        .into_iter()
        .filter(|v| v.status == FileStatus::Deleted)
        .count();
    assert_eq!(deleted, 4);
}

#[tokio::test]
async fn test_delete_of_path_that_exists_again_is_skipped() {
    let t = TestIndexer::new();
    t.add_file("/back.txt", b"here").await;
    let outcome = t.process(IndexRequest::deleted(ROOT, "/back.txt")).await;
    assert_eq!(outcome, IndexOutcome::Skipped);
    assert_eq!(t.get("/back.txt").await.version, 1);
}

fn decode(json: &str) -> IndexRequest {
    serde_json::from_str(json).expect("Failed to decode request")
}

#[tokio::test]
async fn test_decoded_raw_paths_continue_existing_history() {
    let t = TestIndexer::new();
    t.add_file("/a.txt", b"first").await;
    let first = t.get("/a.txt").await;
    t.write_file("/a.txt", b"second, longer");

    let outcome = t
        .process(decode(r#"{"kind":"changed","root_id":"root-1","path":"a.txt"}"#))
        .await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    let current = t.get("/a.txt").await;
    assert_eq!(current.file_id, first.file_id);
    assert_eq!(t.versions_of(first.file_id).await, vec![1, 2]);
    assert_eq!(t.uploaded().len(), 2);
}

#[tokio::test]
async fn test_decoded_nested_path_finds_its_parent() {
    let t = TestIndexer::new();
    t.add_folder("/docs").await;
    t.write_file("/docs/a.txt", b"nested");

    let outcome = t
        .process(decode(r#"{"kind":"new","root_id":"root-1","path":"docs\\a.txt"}"#))
        .await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 1, .. }));

    let child = t.get("/docs/a.txt").await;
    assert_eq!(child.path, "/docs/a.txt");
    assert_eq!(child.parent, Some(t.get("/docs").await.key()));
}

#[tokio::test]
async fn test_parent_segments_fail_the_request() {
    let t = TestIndexer::new();
    t.write_file("/inside.txt", b"x");

    let outcome = t
        .process(decode(
            r#"{"kind":"new","root_id":"root-1","path":"docs/../../inside.txt"}"#,
        ))
        .await;
    assert!(matches!(outcome, IndexOutcome::Failed { .. }));
    assert!(t.find("/inside.txt").await.is_none());
    assert!(t.uploaded().is_empty());
}
