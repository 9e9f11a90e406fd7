//! The output cache capability.

use std::sync::Arc;

use async_trait::async_trait;
use weft_workflow::{Outcome, WorkflowError};

use crate::error::CacheError;

/// A single-slot store for the outcome of a [`CachedWorkflow`](crate::CachedWorkflow).
///
/// After `save(outcome)` completes, every `read()` returns that outcome until
/// it is overwritten or deleted. Calls on one instance must not interleave:
/// no reader may observe a half-written slot.
///
/// Any of the operations may fail; a failure propagates through
/// `CachedWorkflow::run` exactly like a failure of the wrapped workflow.
#[async_trait]
pub trait OutputCache: Send + Sync {
  type Output: Send + 'static;

  /// Return the last saved outcome, or `None` if the slot is empty.
  async fn read(&self) -> Result<Option<Outcome<Self::Output>>, WorkflowError>;

  /// Store an outcome, replacing anything saved before.
  async fn save(&self, outcome: Outcome<Self::Output>) -> Result<(), WorkflowError>;

  /// Return the slot to empty.
  ///
  /// Caches that cannot be reset keep this default.
  async fn delete(&self) -> Result<(), WorkflowError> {
    Err(CacheError::Unsupported { operation: "delete" }.into())
  }
}

#[async_trait]
impl<C: OutputCache + ?Sized> OutputCache for Arc<C> {
  type Output = C::Output;

  async fn read(&self) -> Result<Option<Outcome<C::Output>>, WorkflowError> {
    (**self).read().await
  }

  async fn save(&self, outcome: Outcome<C::Output>) -> Result<(), WorkflowError> {
    (**self).save(outcome).await
  }

  async fn delete(&self) -> Result<(), WorkflowError> {
    (**self).delete().await
  }
}
