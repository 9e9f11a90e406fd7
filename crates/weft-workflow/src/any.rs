//! Type erasure for workflows.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::block::BlockWorkflow;
use crate::error::Outcome;
use crate::workflow::Workflow;

type RunFn<T> = dyn Fn(CancellationToken) -> BoxFuture<'static, Outcome<T>> + Send + Sync;

/// A workflow with its concrete type erased.
///
/// Only a deferred call to the wrapped workflow's `run` is retained. Cloning
/// is cheap and every clone runs the same underlying workflow.
pub struct AnyWorkflow<T> {
  block: Arc<RunFn<T>>,
}

impl<T: Send + 'static> AnyWorkflow<T> {
  /// Erase the type of `workflow`.
  pub fn new<W>(workflow: W) -> Self
  where
    W: Workflow<Output = T> + 'static,
  {
    let workflow = Arc::new(workflow);
    Self {
      block: Arc::new(move |cancel| {
        let workflow = Arc::clone(&workflow);
        Box::pin(async move { workflow.run(cancel).await })
      }),
    }
  }

  /// Build an erased workflow from an async closure.
  pub fn from_fn<F, Fut>(block: F) -> Self
  where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
  {
    Self::new(BlockWorkflow::new(block))
  }
}

impl<T> Clone for AnyWorkflow<T> {
  fn clone(&self) -> Self {
    Self {
      block: Arc::clone(&self.block),
    }
  }
}

impl<T> std::fmt::Debug for AnyWorkflow<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AnyWorkflow")
      .field("output", &std::any::type_name::<T>())
      .finish()
  }
}

#[async_trait]
impl<T: Send + 'static> Workflow for AnyWorkflow<T> {
  type Output = T;

  async fn run(&self, cancel: CancellationToken) -> Outcome<T> {
    (self.block)(cancel).await
  }
}
