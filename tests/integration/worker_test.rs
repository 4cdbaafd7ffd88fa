//! Integration tests for the index worker lanes.

mod helpers;

use std::sync::Arc;

use tokio::sync::watch;

use helpers::{ROOT, TestIndexer};
use syncdesk_core::config::WorkerConfig;
use syncdesk_core::error::ErrorKind;
use syncdesk_index::IndexRequest;
use syncdesk_worker::{IndexExecutor, IndexQueue, IndexWorker, WorkerSummary};

fn worker_config() -> WorkerConfig {
    WorkerConfig {
        lanes: 2,
        queue_capacity: 16,
        shutdown_grace_seconds: 5,
        retry_delay_ms: 10,
    }
}

/// Enqueue `requests`, then shut down and wait for the lanes to drain.
async fn run_to_completion(
    t: &TestIndexer,
    requests: Vec<IndexRequest>,
    max_deferrals: u32,
) -> WorkerSummary {
    let config = worker_config();
    let (queue, receivers) = IndexQueue::new(&config);
    let worker = IndexWorker::new(
        IndexExecutor::new(Arc::clone(&t.indexer)),
        config,
        max_deferrals,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(receivers, shutdown_rx).await });

    for request in requests {
        queue.enqueue(request).await.expect("enqueue");
    }
    shutdown_tx.send(true).expect("signal shutdown");
    handle.await.expect("worker task")
}

#[tokio::test]
async fn test_child_before_parent_is_deferred_then_indexed() {
    let t = TestIndexer::new();
    t.write_file("/docs/a.txt", b"child");

    let summary = run_to_completion(
        &t,
        vec![
            IndexRequest::new_file(ROOT, "/docs/a.txt"),
            IndexRequest::new_file(ROOT, "/docs"),
        ],
        5,
    )
    .await;

    assert_eq!(summary.indexed, 2);
    assert!(summary.deferred >= 1);
    assert_eq!(summary.dropped, 0);
    let folder = t.get("/docs").await;
    assert_eq!(t.get("/docs/a.txt").await.parent, Some(folder.key()));
}

#[tokio::test]
async fn test_request_dropped_after_max_deferrals() {
    let t = TestIndexer::new();
    t.write_file("/orphan/a.txt", b"no parent request");

    let summary =
        run_to_completion(&t, vec![IndexRequest::new_file(ROOT, "/orphan/a.txt")], 2).await;

    assert_eq!(summary.deferred, 2);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.indexed, 0);
    assert!(t.find("/orphan/a.txt").await.is_none());
}

#[tokio::test]
async fn test_redispatch_is_followed() {
    let t = TestIndexer::new();
    t.write_file("/late.txt", b"changed before it was ever seen");

    let summary =
        run_to_completion(&t, vec![IndexRequest::changed(ROOT, "/late.txt")], 5).await;

    assert_eq!(summary.indexed, 1);
    assert_eq!(t.get("/late.txt").await.version, 1);
}

#[tokio::test]
async fn test_same_path_events_apply_in_order() {
    let t = TestIndexer::new();
    t.add_file("/log.txt", b"v1").await;
    t.write_file("/log.txt", b"v2 longer");

    let summary = run_to_completion(
        &t,
        vec![
            IndexRequest::changed(ROOT, "/log.txt"),
            IndexRequest::changed(ROOT, "/log.txt"),
        ],
        5,
    )
    .await;

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.indexed, 1);
    let v = t.get("/log.txt").await;
    assert_eq!(v.version, 2);
    assert_eq!(t.versions_of(v.file_id).await, vec![1, 2]);
}

#[tokio::test]
async fn test_enqueue_refused_after_shutdown() {
    let t = TestIndexer::new();
    let config = worker_config();
    let (queue, receivers) = IndexQueue::new(&config);
    let worker = IndexWorker::new(IndexExecutor::new(Arc::clone(&t.indexer)), config, 5);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(receivers, shutdown_rx).await });

    shutdown_tx.send(true).expect("signal shutdown");
    let summary = handle.await.expect("worker task");
    assert_eq!(summary, WorkerSummary::default());

    let err = queue
        .enqueue(IndexRequest::new_file(ROOT, "/a.txt"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}
