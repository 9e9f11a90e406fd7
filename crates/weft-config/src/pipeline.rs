use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::enums::{ExecutionMode, PipelineView};
use crate::error::ConfigError;

/// A pipeline of demo steps run through a single composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDef {
  pub name: String,
  #[serde(default)]
  pub mode: ExecutionMode,
  #[serde(default)]
  pub view: PipelineView,
  pub steps: Vec<StepDef>,
}

/// One step of a pipeline: sleep, then succeed or fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
  pub name: String,
  #[serde(default)]
  pub delay_ms: u64,
  pub outcome: StepOutcome,
}

/// What a step produces once its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
  Value(serde_json::Value),
  Error(String),
}

impl PipelineDef {
  /// Parse and validate a pipeline from JSON.
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    let pipeline: PipelineDef = serde_json::from_str(json)?;
    pipeline.validate()?;
    Ok(pipeline)
  }

  /// Check that the pipeline has at least one step and unique step names.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.steps.is_empty() {
      return Err(ConfigError::Empty {
        name: self.name.clone(),
      });
    }

    let mut seen = HashSet::new();
    for step in &self.steps {
      if !seen.insert(step.name.as_str()) {
        return Err(ConfigError::DuplicateStep {
          name: self.name.clone(),
          step: step.name.clone(),
        });
      }
    }

    Ok(())
  }
}
