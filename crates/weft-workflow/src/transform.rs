//! Output transforms.

use std::sync::Arc;

use crate::any::AnyWorkflow;
use crate::error::WorkflowError;
use crate::workflow::Workflow;

/// Combinators available on every workflow.
///
/// Transforms only run after the source workflow has succeeded. A source
/// failure is returned unchanged and the transform is never invoked.
pub trait WorkflowExt: Workflow + Sized + 'static {
  /// Wrap this workflow with a type eraser.
  fn erase(self) -> AnyWorkflow<Self::Output> {
    AnyWorkflow::new(self)
  }

  /// Returns a workflow that transforms the output of this workflow.
  fn map<U, F>(self, transform: F) -> AnyWorkflow<U>
  where
    U: Send + 'static,
    F: Fn(Self::Output) -> Result<U, WorkflowError> + Send + Sync + 'static,
  {
    let source = Arc::new(self);
    let transform = Arc::new(transform);
    AnyWorkflow::from_fn(move |cancel| {
      let source = Arc::clone(&source);
      let transform = Arc::clone(&transform);
      async move {
        let output = source.run(cancel).await?;
        (*transform)(output)
      }
    })
  }

  /// Returns a workflow that transforms the output of this workflow into a
  /// new workflow and runs it.
  fn flat_map<W, F>(self, transform: F) -> AnyWorkflow<W::Output>
  where
    W: Workflow + 'static,
    F: Fn(Self::Output) -> Result<W, WorkflowError> + Send + Sync + 'static,
  {
    let source = Arc::new(self);
    let transform = Arc::new(transform);
    AnyWorkflow::from_fn(move |cancel| {
      let source = Arc::clone(&source);
      let transform = Arc::clone(&transform);
      async move {
        let output = source.run(cancel.clone()).await?;
        let next = (*transform)(output)?;
        next.run(cancel).await
      }
    })
  }
}

impl<W: Workflow + 'static> WorkflowExt for W {}
