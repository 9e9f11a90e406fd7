use std::sync::RwLock;

use async_trait::async_trait;
use weft_workflow::{Outcome, WorkflowError};

use crate::cache::OutputCache;

/// An in-memory output cache returning the outcome last saved.
pub struct InMemoryOutputCache<T> {
  slot: RwLock<Option<Outcome<T>>>,
}

impl<T> InMemoryOutputCache<T> {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self {
      slot: RwLock::new(None),
    }
  }

  /// Create a cache already holding `outcome`.
  pub fn with_outcome(outcome: Outcome<T>) -> Self {
    Self {
      slot: RwLock::new(Some(outcome)),
    }
  }

  /// Check whether an outcome is stored.
  pub fn is_empty(&self) -> bool {
    self.slot.read().unwrap_or_else(|e| e.into_inner()).is_none()
  }
}

impl<T> Default for InMemoryOutputCache<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<T> OutputCache for InMemoryOutputCache<T>
where
  T: Clone + Send + Sync + 'static,
{
  type Output = T;

  async fn read(&self) -> Result<Option<Outcome<T>>, WorkflowError> {
    let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
    Ok(slot.clone())
  }

  async fn save(&self, outcome: Outcome<T>) -> Result<(), WorkflowError> {
    let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(outcome);
    Ok(())
  }

  async fn delete(&self) -> Result<(), WorkflowError> {
    let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
    *slot = None;
    Ok(())
  }
}
