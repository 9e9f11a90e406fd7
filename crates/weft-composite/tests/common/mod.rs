//! Shared helpers for composite workflow tests.

#![allow(dead_code)]

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use weft_workflow::{Outcome, Workflow, WorkflowError};

/// An error built from a label, for checking which failure was returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("test error: {0}")]
pub struct TestError(pub String);

impl TestError {
  pub fn new(label: &str) -> Self {
    Self(label.to_string())
  }
}

/// Records the order in which steps finish.
#[derive(Clone, Default)]
pub struct Trace {
  entries: Arc<Mutex<Vec<String>>>,
}

impl Trace {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, entry: impl Into<String>) {
    self.entries.lock().unwrap().push(entry.into());
  }

  pub fn entries(&self) -> Vec<String> {
    self.entries.lock().unwrap().clone()
  }
}

/// A leaf workflow that sleeps, records itself in a trace, then produces a
/// value or fails.
///
/// The sleep watches the cancellation token and returns
/// `WorkflowError::Cancelled` if it fires first.
pub struct Step<V> {
  label: String,
  delay: Duration,
  outcome: Result<V, TestError>,
  trace: Trace,
  runs: Arc<AtomicUsize>,
}

impl<V> Step<V> {
  /// Number of times this step has started.
  pub fn runs(&self) -> Arc<AtomicUsize> {
    self.runs.clone()
  }
}

#[async_trait]
impl<V> Workflow for Step<V>
where
  V: Clone + Send + Sync + 'static,
{
  type Output = V;

  async fn run(&self, cancel: CancellationToken) -> Outcome<V> {
    self.runs.fetch_add(1, Ordering::SeqCst);

    if !self.delay.is_zero() {
      tokio::select! {
        _ = tokio::time::sleep(self.delay) => {}
        _ = cancel.cancelled() => {
          self.trace.push(format!("cancelled {}", self.label));
          return Err(WorkflowError::Cancelled);
        }
      }
    }

    self.trace.push(self.label.clone());
    self.outcome.clone().map_err(WorkflowError::failed)
  }
}

/// A step that succeeds with `value` after `delay_secs` seconds.
pub fn value<V: Debug>(value: V, delay_secs: u64, trace: &Trace) -> Step<V> {
  Step {
    label: format!("{:?}", value),
    delay: Duration::from_secs(delay_secs),
    outcome: Ok(value),
    trace: trace.clone(),
    runs: Arc::new(AtomicUsize::new(0)),
  }
}

/// A step that fails with `TestError(label)` after `delay_secs` seconds.
pub fn failing(label: &str, delay_secs: u64, trace: &Trace) -> Step<String> {
  Step {
    label: format!("error {}", label),
    delay: Duration::from_secs(delay_secs),
    outcome: Err(TestError::new(label)),
    trace: trace.clone(),
    runs: Arc::new(AtomicUsize::new(0)),
  }
}

/// Assert that `err` is the `TestError` with the given label.
pub fn assert_test_error(err: &WorkflowError, label: &str) {
  assert_eq!(
    err.downcast_ref::<TestError>(),
    Some(&TestError::new(label)),
    "unexpected error: {}",
    err
  );
}

pub fn runs(counter: &Arc<AtomicUsize>) -> usize {
  counter.load(Ordering::SeqCst)
}
