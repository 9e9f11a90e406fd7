//! File-backed output cache.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use weft_workflow::{Outcome, WorkflowError};

use crate::cache::OutputCache;
use crate::error::{CacheError, StoredFailure};

/// On-disk form of an outcome.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum StoredOutcome<T> {
  Success { value: T },
  Failure { message: String },
}

/// An output cache that persists its slot as a JSON document.
///
/// Success values round-trip through serde. Failures are stored by message
/// and read back as [`StoredFailure`]: the original error type is lost, so
/// `downcast_ref` on it fails once an outcome has been reloaded. Callers that
/// inspect replayed failures should match on `StoredFailure` instead. A
/// missing file is an empty slot.
pub struct JsonFileOutputCache<T> {
  path: PathBuf,
  lock: Mutex<()>,
  _output: PhantomData<fn() -> T>,
}

impl<T> JsonFileOutputCache<T> {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      lock: Mutex::new(()),
      _output: PhantomData,
    }
  }

  /// Path of the backing file.
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// The file a save is written to before it is renamed over the slot.
  fn staging_path(&self) -> PathBuf {
    let mut staging = self.path.clone().into_os_string();
    staging.push(".partial");
    PathBuf::from(staging)
  }

  fn io_error(&self, source: std::io::Error) -> CacheError {
    CacheError::Io {
      path: self.path.clone(),
      source,
    }
  }
}

#[async_trait]
impl<T> OutputCache for JsonFileOutputCache<T>
where
  T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
  type Output = T;

  async fn read(&self) -> Result<Option<Outcome<T>>, WorkflowError> {
    let _guard = self.lock.lock().await;

    let bytes = match tokio::fs::read(&self.path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(self.io_error(e).into()),
    };

    let stored: StoredOutcome<T> = serde_json::from_slice(&bytes).map_err(CacheError::from)?;
    let outcome = match stored {
      StoredOutcome::Success { value } => Ok(value),
      StoredOutcome::Failure { message } => Err(WorkflowError::failed(StoredFailure { message })),
    };

    Ok(Some(outcome))
  }

  async fn save(&self, outcome: Outcome<T>) -> Result<(), WorkflowError> {
    let _guard = self.lock.lock().await;

    let stored = match &outcome {
      Ok(value) => StoredOutcome::Success { value },
      Err(e) => StoredOutcome::Failure {
        message: e.to_string(),
      },
    };
    let bytes = serde_json::to_vec_pretty(&stored).map_err(CacheError::from)?;

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| self.io_error(e))?;
    }

    // Write then rename so readers never see a partial document.
    let staging = self.staging_path();
    tokio::fs::write(&staging, &bytes)
      .await
      .map_err(|e| self.io_error(e))?;
    tokio::fs::rename(&staging, &self.path)
      .await
      .map_err(|e| self.io_error(e))?;

    debug!(path = %self.path.display(), success = outcome.is_ok(), "outcome persisted");
    Ok(())
  }

  async fn delete(&self) -> Result<(), WorkflowError> {
    let _guard = self.lock.lock().await;

    match tokio::fs::remove_file(&self.path).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
      Err(e) => Err(self.io_error(e).into()),
    }
  }
}
