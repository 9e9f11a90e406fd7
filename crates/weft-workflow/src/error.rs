//! Workflow errors.

use std::error::Error;
use std::sync::Arc;

/// A captured workflow outcome: the success value or the failure.
pub type Outcome<T> = Result<T, WorkflowError>;

/// Errors surfaced by running a workflow.
///
/// Failures are reference counted so a memoized failure can be raised again
/// on every later run without losing the original error value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkflowError {
  /// A cancellation checkpoint observed a cancelled token.
  #[error("workflow cancelled")]
  Cancelled,

  /// The workflow, or a cache backing it, failed.
  #[error(transparent)]
  Failed(Arc<dyn Error + Send + Sync + 'static>),
}

impl WorkflowError {
  /// Wrap an arbitrary error as a workflow failure.
  pub fn failed<E>(error: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    WorkflowError::Failed(Arc::new(error))
  }

  /// A failure carrying only a message.
  pub fn message(message: impl Into<String>) -> Self {
    let error: Box<dyn Error + Send + Sync> = message.into().into();
    WorkflowError::Failed(Arc::from(error))
  }

  pub fn is_cancelled(&self) -> bool {
    matches!(self, WorkflowError::Cancelled)
  }

  /// Borrow the original error if it is of type `E`.
  pub fn downcast_ref<E>(&self) -> Option<&E>
  where
    E: Error + 'static,
  {
    match self {
      WorkflowError::Failed(source) => {
        let source: &(dyn Error + Send + Sync + 'static) = source.as_ref();
        source.downcast_ref::<E>()
      }
      WorkflowError::Cancelled => None,
    }
  }
}
