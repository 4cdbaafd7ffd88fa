//! Integration tests for Moved requests.

mod helpers;

use helpers::{ROOT, TestIndexer, varied};
use syncdesk_core::config::IndexConfig;
use syncdesk_core::traits::EncryptionContext;
use syncdesk_entity::file::{FileStatus, SyncStatus};
use syncdesk_index::{IndexOutcome, IndexRequest};

async fn docs_tree(t: &TestIndexer) {
    t.add_folder("/docs").await;
    t.add_file("/docs/a.txt", b"alpha").await;
    t.add_file("/docs/b.txt", b"bravo!").await;
    t.add_folder("/archive").await;
}

#[tokio::test]
async fn test_folder_move_renames_children() {
    let t = TestIndexer::new();
    docs_tree(&t).await;
    let folder = t.get("/docs").await;
    let a = t.get("/docs/a.txt").await;
    let b = t.get("/docs/b.txt").await;
    let uploads_before = t.uploaded().len();

    t.rename("/docs", "/archive/docs");
    let outcome = t
        .process(IndexRequest::moved(ROOT, "/docs", "/archive/docs"))
        .await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    let moved = t.get("/archive/docs").await;
    assert_eq!(moved.file_id, folder.file_id);
    assert_eq!(moved.version, 2);
    assert_eq!(moved.status, FileStatus::Renamed);
    assert_eq!(moved.sync_status, SyncStatus::UpToDate);
    assert_eq!(moved.parent, Some(t.get("/archive").await.key()));

    for (before, path) in [(&a, "/archive/docs/a.txt"), (&b, "/archive/docs/b.txt")] {
        let child = t.get(path).await;
        assert_eq!(child.file_id, before.file_id);
        assert_eq!(child.version, 2);
        assert_eq!(child.status, FileStatus::Renamed);
        assert_eq!(child.parent, Some(moved.key()));
        assert_eq!(child.chunks, before.chunks);
        assert_eq!(child.checksum, before.checksum);
    }

    assert!(t.find("/docs").await.is_none());
    assert!(t.find("/docs/a.txt").await.is_none());
    assert_eq!(t.uploaded().len(), uploads_before + 3);
}

#[tokio::test]
async fn test_nested_folders_follow_the_move() {
    let t = TestIndexer::new();
    t.add_folder("/docs").await;
    t.add_folder("/docs/sub").await;
    t.add_folder("/docs/sub/deeper").await;
    t.add_file("/docs/sub/deeper/c.txt", b"charlie").await;

    t.rename("/docs", "/papers");
    t.process(IndexRequest::moved(ROOT, "/docs", "/papers")).await;

    let sub = t.get("/papers/sub").await;
    let deeper = t.get("/papers/sub/deeper").await;
    let c = t.get("/papers/sub/deeper/c.txt").await;
    assert_eq!(deeper.parent, Some(sub.key()));
    assert_eq!(c.parent, Some(deeper.key()));
    assert_eq!(c.name, "c.txt");
    assert_eq!(c.version, 2);
}

#[tokio::test]
async fn test_move_depth_is_bounded() {
    let t = TestIndexer::with_config(IndexConfig {
        chunk_size_bytes: 1024,
        max_tree_depth: 1,
        ..IndexConfig::default()
    });
    t.add_folder("/docs").await;
    t.add_folder("/docs/sub").await;
    t.add_file("/docs/sub/c.txt", b"too deep").await;

    t.rename("/docs", "/papers");
    t.process(IndexRequest::moved(ROOT, "/docs", "/papers")).await;

    assert!(t.find("/papers/sub").await.is_some());
    assert!(t.find("/papers/sub/c.txt").await.is_none());
    assert!(t.find("/docs/sub/c.txt").await.is_some());
}

#[tokio::test]
async fn test_file_rename_continues_history() {
    let t = TestIndexer::new();
    let data = varied(2500, 9);
    t.add_file("/draft.txt", &data).await;
    let before = t.get("/draft.txt").await;

    t.rename("/draft.txt", "/final.txt");
    t.process(IndexRequest::moved(ROOT, "/draft.txt", "/final.txt"))
        .await;

    let after = t.get("/final.txt").await;
    assert_eq!(after.file_id, before.file_id);
    assert_eq!(after.version, 2);
    assert_eq!(after.name, "final.txt");
    assert_eq!(after.chunks, before.chunks);
    assert_eq!(t.versions_of(before.file_id).await, vec![1, 2]);
}

#[tokio::test]
async fn test_move_into_workspace_rechunks_under_workspace_context() {
    let t = TestIndexer::new();
    let workspace = t.register_workspace("/shared").await;
    t.add_folder("/shared").await;
    t.add_file("/mine.txt", &varied(1500, 4)).await;
    let before = t.get("/mine.txt").await;

    t.rename("/mine.txt", "/shared/mine.txt");
    t.process(IndexRequest::moved(ROOT, "/mine.txt", "/shared/mine.txt"))
        .await;

    let after = t.get("/shared/mine.txt").await;
    assert_eq!(after.workspace_id, Some(workspace));
    assert_eq!(after.chunks.len(), before.chunks.len());
    let context = EncryptionContext::workspace_id(&workspace);
    for (old, new) in before.chunks.iter().zip(&after.chunks) {
        assert_eq!(old.checksum, new.checksum);
        assert_eq!(new.context, context);
    }
}

#[tokio::test]
async fn test_unknown_source_redispatches_destination_as_new() {
    let t = TestIndexer::new();
    t.write_file("/appeared.txt", b"from nowhere");

    let outcome = t
        .process(IndexRequest::moved(ROOT, "/unknown.txt", "/appeared.txt"))
        .await;
    assert_eq!(
        outcome,
        IndexOutcome::Redispatched(Box::new(IndexRequest::new_file(ROOT, "/appeared.txt")))
    );
}

#[tokio::test]
async fn test_vanished_destination_is_abandoned() {
    let t = TestIndexer::new();
    t.add_file("/a.txt", b"a").await;

    let outcome = t
        .process(IndexRequest::moved(ROOT, "/a.txt", "/gone.txt"))
        .await;
    assert_eq!(outcome, IndexOutcome::Vanished);
    assert_eq!(t.get("/a.txt").await.version, 1);
}

#[tokio::test]
async fn test_move_into_unindexed_folder_defers() {
    let t = TestIndexer::new();
    t.add_file("/a.txt", b"a").await;
    t.rename("/a.txt", "/new-folder/a.txt");

    let outcome = t
        .process(IndexRequest::moved(ROOT, "/a.txt", "/new-folder/a.txt"))
        .await;
    assert_eq!(outcome, IndexOutcome::Deferred);
    assert_eq!(t.get("/a.txt").await.version, 1);
}

#[tokio::test]
async fn test_move_to_illegal_name_is_withheld() {
    let t = TestIndexer::new();
    t.add_file("/ok.txt", b"fine").await;
    t.rename("/ok.txt", "/not:ok.txt");

    let outcome = t
        .process(IndexRequest::moved(ROOT, "/ok.txt", "/not:ok.txt"))
        .await;
    assert!(matches!(outcome, IndexOutcome::Withheld { version: 2, .. }));
    assert_eq!(t.get("/not:ok.txt").await.sync_status, SyncStatus::Unsync);
}

#[tokio::test]
async fn test_ignored_destination_is_dropped() {
    let t = TestIndexer::new();
    t.add_file("/a.txt", b"a").await;
    t.rename("/a.txt", "/a.txt.swp");

    let outcome = t
        .process(IndexRequest::moved(ROOT, "/a.txt", "/a.txt.swp"))
        .await;
    assert_eq!(outcome, IndexOutcome::Ignored);
}

#[tokio::test]
async fn test_rename_over_indexed_file_deletes_the_overwritten_history() {
    let t = TestIndexer::new();
    t.add_folder("/d").await;
    t.add_file("/d/a.txt", b"alpha").await;
    t.add_file("/d/b.txt", b"bravo!").await;
    let a = t.get("/d/a.txt").await;
    let b = t.get("/d/b.txt").await;

    t.rename("/d/a.txt", "/d/b.txt");
    let outcome = t
        .process(IndexRequest::moved(ROOT, "/d/a.txt", "/d/b.txt"))
        .await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    assert_eq!(t.get("/d/b.txt").await.file_id, a.file_id);
    assert_eq!(t.versions_of(b.file_id).await, vec![1, 2]);
    let displaced = t
        .uploaded()
        .into_iter()
        .find(|v| v.file_id == b.file_id && v.version == 2)
        .expect("deletion of the overwritten file queued");
    assert_eq!(displaced.status, FileStatus::Deleted);

    t.rename("/d", "/e");
    t.process(IndexRequest::moved(ROOT, "/d", "/e")).await;

    let live: Vec<_> = t.live().await.into_iter().map(|v| v.path).collect();
    assert_eq!(live, vec!["/e", "/e/b.txt"]);
    assert_eq!(t.get("/e/b.txt").await.file_id, a.file_id);
    let uploads_at_b = t
        .uploaded()
        .into_iter()
        .filter(|v| v.path == "/e/b.txt")
        .count();
    assert_eq!(uploads_at_b, 1);
}

#[tokio::test]
async fn test_failed_child_does_not_stop_its_siblings() {
    let t = TestIndexer::new();
    docs_tree(&t).await;
    let b = t.get("/docs/b.txt").await;
    t.uploads.reject("/archive/docs/a.txt");

    t.rename("/docs", "/archive/docs");
    let outcome = t
        .process(IndexRequest::moved(ROOT, "/docs", "/archive/docs"))
        .await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    let sibling = t.get("/archive/docs/b.txt").await;
    assert_eq!(sibling.file_id, b.file_id);
    assert_eq!(sibling.version, 2);
    assert_eq!(sibling.status, FileStatus::Renamed);
    assert!(
        t.uploaded()
            .iter()
            .any(|v| v.path == "/archive/docs/b.txt" && v.status == FileStatus::Renamed)
    );
    assert!(t.uploaded().iter().all(|v| v.path != "/archive/docs/a.txt"));
}

#[tokio::test]
async fn test_failed_descendant_does_not_stop_folder_delete() {
    let t = TestIndexer::new();
    docs_tree(&t).await;
    let a = t.get("/docs/a.txt").await;
    t.uploads.reject("/docs/b.txt");

    t.remove("/docs");
    let outcome = t.process(IndexRequest::deleted(ROOT, "/docs")).await;
    assert!(matches!(outcome, IndexOutcome::Indexed { version: 2, .. }));

    assert!(t.find("/docs").await.is_none());
    assert!(t.find("/docs/a.txt").await.is_none());
    assert_eq!(t.versions_of(a.file_id).await, vec![1, 2]);
    let deleted: Vec<_> = t
        .uploaded()
        .into_iter()
        .filter(|v| v.status == FileStatus::Deleted)
        .map(|v| v.path)
        .collect();
    assert_eq!(deleted, vec!["/docs", "/docs/a.txt"]);
}
