//! Weft Cache
//!
//! This crate provides [`CachedWorkflow`], a wrapper that runs its child
//! workflow at most once and replays the stored outcome on every later run.
//!
//! Outcomes live in an [`OutputCache`], a single slot that is either empty or
//! holds a success value or a failure. Two backends are included:
//! - [`InMemoryOutputCache`] (the default)
//! - [`JsonFileOutputCache`], which persists outcomes as JSON documents
//!
//! Cancellations are never stored. A run that observes a cancelled token
//! before or after the child completes returns
//! [`WorkflowError::Cancelled`](weft_workflow::WorkflowError::Cancelled) and
//! leaves the slot untouched, so a later run executes the child again.

mod cache;
mod cached;
mod error;
mod file;
mod memory;

pub use cache::OutputCache;
pub use cached::CachedWorkflow;
pub use error::{CacheError, StoredFailure};
pub use file::JsonFileOutputCache;
pub use memory::InMemoryOutputCache;
