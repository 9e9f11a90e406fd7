//! Per-child concurrent composite.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};
use weft_workflow::{Outcome, Workflow};

use crate::engine::{self, FailurePolicy};
use crate::tuple::{CacheableTuple, WorkflowTuple};

/// A workflow that runs its children concurrently and reports an outcome
/// for each.
///
/// Every call wraps each child in a fresh
/// [`CachedWorkflow`](weft_cache::CachedWorkflow), so outcomes are memoized
/// for that call only and a later call runs every child again.
pub struct ZipWorkflow<T: CacheableTuple> {
  children: Arc<T::Shared>,
}

impl<T: CacheableTuple> ZipWorkflow<T> {
  pub fn new(children: T) -> Self {
    Self {
      children: Arc::new(children.into_shared()),
    }
  }

  /// Number of child workflows.
  pub fn arity(&self) -> usize {
    self.children.arity()
  }

  /// Run every child concurrently and wait for all of them, capturing one
  /// outcome per child.
  #[instrument(
    name = "composite_outcomes",
    skip_all,
    fields(kind = "zip", arity = self.children.arity())
  )]
  pub async fn outcomes(&self, cancel: CancellationToken) -> T::Outcomes {
    let cached = Arc::new(T::cached(&self.children));
    let outcomes = engine::collect_concurrent(&cached, &cancel).await;
    <T::Cached as WorkflowTuple>::assemble_outcomes(outcomes)
  }

  /// Run every child concurrently, returning their outputs.
  ///
  /// The first child to fail, in completion order, ends the run with its
  /// failure and every child still running is cancelled.
  #[instrument(
    name = "composite_result",
    skip_all,
    fields(kind = "zip", arity = self.children.arity())
  )]
  pub async fn result(&self, cancel: CancellationToken) -> Outcome<T::Output> {
    let cached = Arc::new(T::cached(&self.children));
    let values = engine::run_concurrent(&cached, &cancel, FailurePolicy::CancelSiblings).await;

    match values {
      Ok(values) => Ok(<T::Cached as WorkflowTuple>::assemble(values)),
      Err(e) => {
        error!(error = %e, "composite_failed");
        Err(e)
      }
    }
  }
}

#[async_trait]
impl<T: CacheableTuple> Workflow for ZipWorkflow<T> {
  type Output = T::Outcomes;

  async fn run(&self, cancel: CancellationToken) -> Outcome<T::Outcomes> {
    Ok(self.outcomes(cancel).await)
  }
}
