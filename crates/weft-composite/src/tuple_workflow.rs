//! General fixed-arity composite.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};
use weft_config::ExecutionMode;
use weft_workflow::{Outcome, Workflow};

use crate::engine::{self, FailurePolicy};
use crate::tuple::WorkflowTuple;

/// A workflow that runs a fixed collection of child workflows.
///
/// In [`ExecutionMode::Sequential`] the children run in declaration order and
/// the first failure stops the run; later children are never started.
///
/// In [`ExecutionMode::Concurrent`] every child starts at once inside a task
/// group scoped to the call. The run waits for all of them, even after a
/// failure, and returns the error of whichever child failed first in
/// completion order.
pub struct TupleWorkflow<T> {
  children: Arc<T>,
  mode: ExecutionMode,
}

impl<T: WorkflowTuple> TupleWorkflow<T> {
  pub fn new(children: T, mode: ExecutionMode) -> Self {
    Self {
      children: Arc::new(children),
      mode,
    }
  }

  pub fn mode(&self) -> ExecutionMode {
    self.mode
  }

  /// Number of child workflows.
  pub fn arity(&self) -> usize {
    self.children.arity()
  }
}

/// A workflow that runs the children one after another.
pub fn chain<T: WorkflowTuple>(children: T) -> TupleWorkflow<T> {
  TupleWorkflow::new(children, ExecutionMode::Sequential)
}

/// A workflow that runs the children concurrently.
pub fn zip<T: WorkflowTuple>(children: T) -> TupleWorkflow<T> {
  TupleWorkflow::new(children, ExecutionMode::Concurrent)
}

#[async_trait]
impl<T: WorkflowTuple> Workflow for TupleWorkflow<T> {
  type Output = T::Output;

  #[instrument(
    name = "composite_run",
    skip_all,
    fields(kind = "tuple", mode = %self.mode, arity = self.children.arity())
  )]
  async fn run(&self, cancel: CancellationToken) -> Outcome<T::Output> {
    let values = match self.mode {
      ExecutionMode::Sequential => engine::run_sequential(&self.children, &cancel).await,
      ExecutionMode::Concurrent => {
        engine::run_concurrent(&self.children, &cancel, FailurePolicy::WaitForAll).await
      }
    };

    match values {
      Ok(values) => Ok(T::assemble(values)),
      Err(e) => {
        error!(error = %e, "composite_failed");
        Err(e)
      }
    }
  }
}
