use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Outcome;
use crate::workflow::Workflow;

/// A workflow backed by an async closure.
///
/// The closure is invoked on every run, so each run gets a fresh future.
pub struct BlockWorkflow<F> {
  block: F,
}

impl<F> BlockWorkflow<F> {
  pub fn new(block: F) -> Self {
    Self { block }
  }
}

#[async_trait]
impl<F, Fut, T> Workflow for BlockWorkflow<F>
where
  F: Fn(CancellationToken) -> Fut + Send + Sync,
  Fut: Future<Output = Outcome<T>> + Send + 'static,
  T: Send + 'static,
{
  type Output = T;

  async fn run(&self, cancel: CancellationToken) -> Outcome<T> {
    (self.block)(cancel).await
  }
}
