//! Weft Config
//!
//! This crate contains the serializable configuration types for weft.
//! [`ExecutionMode`] is the concurrency flag every composite is built with;
//! [`PipelineDef`] describes a list of demo steps that the `weft` runner
//! turns into workflows.
//!
//! Pipelines are loaded from JSON files:
//!
//! ```json
//! {
//!   "name": "example",
//!   "mode": "concurrent",
//!   "view": "outcomes",
//!   "steps": [
//!     { "name": "fetch", "delay_ms": 40, "outcome": { "value": 1 } },
//!     { "name": "parse", "delay_ms": 10, "outcome": { "error": "bad input" } }
//!   ]
//! }
//! ```

mod enums;
mod error;
mod pipeline;

pub use enums::{ExecutionMode, PipelineView};
pub use error::ConfigError;
pub use pipeline::{PipelineDef, StepDef, StepOutcome};
