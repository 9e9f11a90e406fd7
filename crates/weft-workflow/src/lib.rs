//! Weft Workflow
//!
//! This crate provides the [`Workflow`] capability: a deferred unit of async
//! work that, when run, eventually produces a typed value or fails with a
//! [`WorkflowError`].
//!
//! A leaf workflow makes no idempotency promise. Running it twice may repeat
//! its side effects; memoization is provided by `weft-cache`, and sequential
//! or concurrent composition by `weft-composite`.
//!
//! # Usage
//!
//! ```ignore
//! use weft_workflow::{AnyWorkflow, WorkflowExt};
//! use tokio_util::sync::CancellationToken;
//!
//! let count = AnyWorkflow::from_fn(|_cancel| async { Ok(41) })
//!   .map(|n| Ok(n + 1));
//!
//! assert_eq!(count.run(CancellationToken::new()).await?, 42);
//! ```

mod any;
mod block;
mod error;
mod transform;
mod workflow;

pub use any::AnyWorkflow;
pub use block::BlockWorkflow;
pub use error::{Outcome, WorkflowError};
pub use transform::WorkflowExt;
pub use workflow::{Workflow, checkpoint};

/// Re-exported so implementors can name the token without a direct dependency.
pub use tokio_util::sync::CancellationToken;
