//! At-most-once workflow execution.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use weft_workflow::{Outcome, Workflow, WorkflowError, checkpoint};

use crate::cache::OutputCache;
use crate::memory::InMemoryOutputCache;

/// A workflow that runs a child workflow once and replays its outcome.
///
/// Successes and failures are both stored: once the child has failed, every
/// later run returns that same failure until the cache is reset.
///
/// The whole read, execute and save sequence runs under one lock, so callers
/// that arrive concurrently before the first outcome is stored collapse into
/// a single execution of the child.
pub struct CachedWorkflow<W: Workflow> {
  workflow: W,
  cache: Arc<dyn OutputCache<Output = W::Output>>,
  flight: Mutex<()>,
}

impl<W> CachedWorkflow<W>
where
  W: Workflow,
  W::Output: Clone + Sync,
{
  /// Wrap `workflow` with an [`InMemoryOutputCache`].
  pub fn new(workflow: W) -> Self {
    Self::with_cache(workflow, InMemoryOutputCache::new())
  }
}

impl<W: Workflow> CachedWorkflow<W> {
  /// Wrap `workflow` with a custom cache.
  pub fn with_cache<C>(workflow: W, cache: C) -> Self
  where
    C: OutputCache<Output = W::Output> + 'static,
  {
    Self {
      workflow,
      cache: Arc::new(cache),
      flight: Mutex::new(()),
    }
  }

  /// Delete the stored outcome so the next run executes the child again.
  ///
  /// Fails with [`CacheError::Unsupported`](crate::CacheError::Unsupported)
  /// if the cache cannot be reset.
  pub async fn reset(&self) -> Result<(), WorkflowError> {
    let _flight = self.flight.lock().await;
    self.cache.delete().await?;
    debug!("cached outcome deleted");
    Ok(())
  }

  /// Borrow the wrapped workflow.
  pub fn inner(&self) -> &W {
    &self.workflow
  }
}

impl<W> CachedWorkflow<W>
where
  W: Workflow,
  W::Output: Clone,
{
  /// Return a stored outcome, unless the caller has been cancelled.
  fn resolve(
    &self,
    outcome: Outcome<W::Output>,
    cancel: &CancellationToken,
  ) -> Outcome<W::Output> {
    checkpoint(cancel)?;
    debug!(success = outcome.is_ok(), "replaying cached outcome");
    outcome
  }
}

#[async_trait]
impl<W> Workflow for CachedWorkflow<W>
where
  W: Workflow,
  W::Output: Clone,
{
  type Output = W::Output;

  #[instrument(name = "cached_run", skip_all)]
  async fn run(&self, cancel: CancellationToken) -> Outcome<W::Output> {
    if let Some(outcome) = self.cache.read().await? {
      return self.resolve(outcome, &cancel);
    }

    let _flight = self.flight.lock().await;

    // Another caller may have stored an outcome while this one waited.
    if let Some(outcome) = self.cache.read().await? {
      return self.resolve(outcome, &cancel);
    }

    checkpoint(&cancel)?;
    debug!("no cached outcome, running workflow");
    let outcome = self.workflow.run(cancel.clone()).await;

    if cancel.is_cancelled() || matches!(outcome, Err(WorkflowError::Cancelled)) {
      warn!("workflow cancelled, outcome not cached");
      return Err(WorkflowError::Cancelled);
    }

    self.cache.save(outcome.clone()).await?;
    debug!(success = outcome.is_ok(), "workflow outcome cached");
    outcome
  }
}
