//! Per-child sequential composite.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};
use weft_workflow::{Outcome, Workflow};

use crate::engine;
use crate::tuple::{CacheableTuple, WorkflowTuple};

/// A workflow that runs its children one after another and reports an
/// outcome for each.
///
/// Each call is independent: children run again every time a view is
/// called. [`result`](Self::result) wraps every child in a fresh
/// [`CachedWorkflow`](weft_cache::CachedWorkflow) for the duration of the
/// call.
pub struct SequenceWorkflow<T: CacheableTuple> {
  children: Arc<T::Shared>,
}

impl<T: CacheableTuple> SequenceWorkflow<T> {
  pub fn new(children: T) -> Self {
    Self {
      children: Arc::new(children.into_shared()),
    }
  }

  /// Number of child workflows.
  pub fn arity(&self) -> usize {
    self.children.arity()
  }

  /// Run every child in order, capturing one outcome per child.
  ///
  /// A failure does not stop the sequence; later children still run.
  #[instrument(
    name = "composite_outcomes",
    skip_all,
    fields(kind = "sequence", arity = self.children.arity())
  )]
  pub async fn outcomes(&self, cancel: CancellationToken) -> T::Outcomes {
    let outcomes = engine::collect_sequential(&self.children, &cancel).await;
    <T::Shared as WorkflowTuple>::assemble_outcomes(outcomes)
  }

  /// Run every child in order, returning their outputs.
  ///
  /// The first child, in declaration order, holding a failure ends the run
  /// with that failure; later children are not started.
  #[instrument(
    name = "composite_result",
    skip_all,
    fields(kind = "sequence", arity = self.children.arity())
  )]
  pub async fn result(&self, cancel: CancellationToken) -> Outcome<T::Output> {
    let cached = Arc::new(T::cached(&self.children));

    match engine::run_sequential(&cached, &cancel).await {
      Ok(values) => Ok(<T::Cached as WorkflowTuple>::assemble(values)),
      Err(e) => {
        error!(error = %e, "composite_failed");
        Err(e)
      }
    }
  }
}

#[async_trait]
impl<T: CacheableTuple> Workflow for SequenceWorkflow<T> {
  type Output = T::Outcomes;

  async fn run(&self, cancel: CancellationToken) -> Outcome<T::Outcomes> {
    Ok(self.outcomes(cancel).await)
  }
}
