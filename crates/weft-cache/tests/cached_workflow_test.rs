//! Integration tests for CachedWorkflow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use weft_cache::{CacheError, CachedWorkflow, InMemoryOutputCache, JsonFileOutputCache, OutputCache};
use weft_workflow::{Outcome, Workflow, WorkflowError};

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("test error {0}")]
struct TestError(u32);

/// Counts runs and produces a fixed outcome after an optional delay.
struct CountingWorkflow {
  runs: Arc<AtomicUsize>,
  delay: Duration,
  fail: Option<u32>,
}

impl CountingWorkflow {
  fn value(runs: &Arc<AtomicUsize>) -> Self {
    Self {
      runs: runs.clone(),
      delay: Duration::ZERO,
      fail: None,
    }
  }

  fn failing(runs: &Arc<AtomicUsize>, code: u32) -> Self {
    Self {
      runs: runs.clone(),
      delay: Duration::ZERO,
      fail: Some(code),
    }
  }

  fn delayed(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

#[async_trait]
impl Workflow for CountingWorkflow {
  type Output = usize;

  async fn run(&self, _cancel: CancellationToken) -> Outcome<usize> {
    let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
    }
    match self.fail {
      Some(code) => Err(WorkflowError::failed(TestError(code))),
      None => Ok(run),
    }
  }
}

/// A cache whose operations always fail.
struct BrokenCache {
  fail_read: bool,
}

#[async_trait]
impl OutputCache for BrokenCache {
  type Output = usize;

  async fn read(&self) -> Result<Option<Outcome<usize>>, WorkflowError> {
    if self.fail_read {
      return Err(WorkflowError::failed(TestError(500)));
    }
    Ok(None)
  }

  async fn save(&self, _outcome: Outcome<usize>) -> Result<(), WorkflowError> {
    Err(WorkflowError::failed(TestError(501)))
  }
}

#[tokio::test]
async fn test_value_is_computed_once() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::new(CountingWorkflow::value(&runs));

  let first = cached.run(CancellationToken::new()).await.unwrap();
  let second = cached.run(CancellationToken::new()).await.unwrap();

  assert_eq!(first, 1);
  assert_eq!(second, 1);
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_inner_bypasses_cache() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::new(CountingWorkflow::value(&runs));

  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 1);
  assert_eq!(cached.inner().run(CancellationToken::new()).await.unwrap(), 2);
  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 1);
  assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_is_replayed_without_retry() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::new(CountingWorkflow::failing(&runs, 7));

  let first = cached.run(CancellationToken::new()).await.unwrap_err();
  let second = cached.run(CancellationToken::new()).await.unwrap_err();

  assert_eq!(first.downcast_ref::<TestError>(), Some(&TestError(7)));
  match (first, second) {
    (WorkflowError::Failed(a), WorkflowError::Failed(b)) => assert!(Arc::ptr_eq(&a, &b)),
    other => panic!("expected failures, got {:?}", other),
  }
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_callers_share_one_execution() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = Arc::new(CachedWorkflow::new(
    CountingWorkflow::value(&runs).delayed(Duration::from_millis(20)),
  ));

  let calls = (0..16).map(|_| {
    let cached = cached.clone();
    tokio::spawn(async move { cached.run(CancellationToken::new()).await })
  });
  let outputs = futures::future::join_all(calls).await;

  for output in outputs {
    assert_eq!(output.unwrap().unwrap(), 1);
  }
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_before_run_skips_child() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cache = Arc::new(InMemoryOutputCache::new());
  let cached = CachedWorkflow::with_cache(CountingWorkflow::value(&runs), cache.clone());

  let cancel = CancellationToken::new();
  cancel.cancel();

  let err = cached.run(cancel).await.unwrap_err();
  assert!(err.is_cancelled());
  assert_eq!(runs.load(Ordering::SeqCst), 0);
  assert!(cache.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_during_run_is_not_cached() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cache = Arc::new(InMemoryOutputCache::new());
  let cached = Arc::new(CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs).delayed(Duration::from_secs(5)),
    cache.clone(),
  ));

  let cancel = CancellationToken::new();
  let handle = {
    let cached = cached.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move { cached.run(cancel).await })
  };

  tokio::time::sleep(Duration::from_secs(1)).await;
  cancel.cancel();

  let err = handle.await.unwrap().unwrap_err();
  assert!(err.is_cancelled());
  assert!(cache.is_empty());

  // A later run executes the child again and caches its value.
  let output = cached.run(CancellationToken::new()).await.unwrap();
  assert_eq!(output, 2);
  assert_eq!(runs.load(Ordering::SeqCst), 2);
  assert!(!cache.is_empty());
}

#[tokio::test]
async fn test_child_cancellation_is_not_cached() {
  let cache = Arc::new(InMemoryOutputCache::<u32>::new());
  let child = weft_workflow::AnyWorkflow::from_fn(|_cancel| async { Err(WorkflowError::Cancelled) });
  let cached = CachedWorkflow::with_cache(child, cache.clone());

  let err = cached.run(CancellationToken::new()).await.unwrap_err();
  assert!(err.is_cancelled());
  assert!(cache.is_empty());
}

#[tokio::test]
async fn test_cache_hit_still_checks_cancellation() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::new(CountingWorkflow::value(&runs));
  cached.run(CancellationToken::new()).await.unwrap();

  let cancel = CancellationToken::new();
  cancel.cancel();

  let err = cached.run(cancel).await.unwrap_err();
  assert!(err.is_cancelled());
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_preseeded_cache_never_runs_child() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    InMemoryOutputCache::with_outcome(Ok(99)),
  );

  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 99);
  assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_read_failure_propagates() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    BrokenCache { fail_read: true },
  );

  let err = cached.run(CancellationToken::new()).await.unwrap_err();
  assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError(500)));
  assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cache_save_failure_propagates() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    BrokenCache { fail_read: false },
  );

  let err = cached.run(CancellationToken::new()).await.unwrap_err();
  assert_eq!(err.downcast_ref::<TestError>(), Some(&TestError(501)));
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_reset_reruns_child() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::new(CountingWorkflow::value(&runs));

  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 1);
  cached.reset().await.unwrap();
  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 2);
  assert_eq!(cached.run(CancellationToken::new()).await.unwrap(), 2);
}

#[tokio::test]
async fn test_reset_unsupported_by_cache() {
  let runs = Arc::new(AtomicUsize::new(0));
  let cached = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    BrokenCache { fail_read: false },
  );

  let err = cached.reset().await.unwrap_err();
  assert!(matches!(
    err.downcast_ref::<CacheError>(),
    Some(CacheError::Unsupported { operation: "delete" })
  ));
}

#[tokio::test]
async fn test_file_cache_survives_new_instance() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("count.json");
  let runs = Arc::new(AtomicUsize::new(0));

  let first = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    JsonFileOutputCache::new(&path),
  );
  assert_eq!(first.run(CancellationToken::new()).await.unwrap(), 1);

  let second = CachedWorkflow::with_cache(
    CountingWorkflow::value(&runs),
    JsonFileOutputCache::new(&path),
  );
  assert_eq!(second.run(CancellationToken::new()).await.unwrap(), 1);
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}
