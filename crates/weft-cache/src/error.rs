//! Cache errors.

use std::path::PathBuf;

use weft_workflow::WorkflowError;

/// Errors raised by cache backends.
///
/// These reach callers as [`WorkflowError::Failed`], the same way a child
/// failure does.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  /// Reading or writing the backing file failed.
  #[error("cache io failed for '{}': {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The stored outcome could not be encoded or decoded.
  #[error("invalid cached outcome: {0}")]
  Serialization(#[from] serde_json::Error),

  /// The backend does not implement the operation.
  #[error("cache does not support {operation}")]
  Unsupported { operation: &'static str },
}

impl From<CacheError> for WorkflowError {
  fn from(error: CacheError) -> Self {
    WorkflowError::failed(error)
  }
}

/// A failure replayed from a persistent cache.
///
/// Only the display message of the original error survives serialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StoredFailure {
  pub message: String,
}
