use serde::{Deserialize, Serialize};

/// How a composite schedules its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
  /// Children run one after another in declaration order.
  #[default]
  Sequential,
  /// Children start together and run inside one task group.
  Concurrent,
}

impl ExecutionMode {
  pub fn is_concurrent(self) -> bool {
    matches!(self, ExecutionMode::Concurrent)
  }
}

impl std::fmt::Display for ExecutionMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ExecutionMode::Sequential => f.write_str("sequential"),
      ExecutionMode::Concurrent => f.write_str("concurrent"),
    }
  }
}

/// Which result shape a pipeline run reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineView {
  /// All-or-nothing tuple of outputs.
  #[default]
  Tuple,
  /// One outcome per step, never failing as a whole.
  Outcomes,
  /// Outputs of every step, or the first failure.
  Result,
}
