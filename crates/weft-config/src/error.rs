use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The document is not valid pipeline JSON.
  #[error("invalid pipeline definition: {0}")]
  Parse(#[from] serde_json::Error),

  /// The pipeline has no steps.
  #[error("pipeline '{name}' has no steps")]
  Empty { name: String },

  /// Two steps share a name.
  #[error("pipeline '{name}' declares step '{step}' more than once")]
  DuplicateStep { name: String, step: String },
}
