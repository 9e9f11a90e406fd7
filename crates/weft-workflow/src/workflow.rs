//! The workflow capability.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{Outcome, WorkflowError};

/// A block of async work that runs to completion and produces an output.
///
/// The cancellation token is the scheduler's cooperative cancellation
/// signal. Implementations that suspend for a long time should watch it and
/// return [`WorkflowError::Cancelled`] once it fires.
///
/// ```ignore
/// struct FetchDogs {
///   service: DogsService,
/// }
///
/// #[async_trait]
/// impl Workflow for FetchDogs {
///   type Output = Vec<Dog>;
///
///   async fn run(&self, cancel: CancellationToken) -> Outcome<Vec<Dog>> {
///     checkpoint(&cancel)?;
///     self.service.fetch().await.map_err(WorkflowError::failed)
///   }
/// }
/// ```
#[async_trait]
pub trait Workflow: Send + Sync {
  type Output: Send + 'static;

  /// Run the workflow, generating an output.
  async fn run(&self, cancel: CancellationToken) -> Outcome<Self::Output>;
}

#[async_trait]
impl<W: Workflow + ?Sized> Workflow for Arc<W> {
  type Output = W::Output;

  async fn run(&self, cancel: CancellationToken) -> Outcome<W::Output> {
    (**self).run(cancel).await
  }
}

#[async_trait]
impl<W: Workflow + ?Sized> Workflow for Box<W> {
  type Output = W::Output;

  async fn run(&self, cancel: CancellationToken) -> Outcome<W::Output> {
    (**self).run(cancel).await
  }
}

/// Cooperative cancellation check.
///
/// Returns [`WorkflowError::Cancelled`] if the token has been cancelled.
pub fn checkpoint(cancel: &CancellationToken) -> Result<(), WorkflowError> {
  if cancel.is_cancelled() {
    return Err(WorkflowError::Cancelled);
  }
  Ok(())
}
