//! Weft Composite
//!
//! This crate composes fixed, ordered collections of child workflows.
//! Children are given as a tuple (each child with its own output type) or as
//! a `Vec` of same-typed children; see [`WorkflowTuple`].
//!
//! # Architecture
//!
//! ```text
//! TupleWorkflow (chain / zip)
//! ├── sequential: children in declaration order, first failure stops the run
//! └── concurrent: children in one task group, every child runs to completion,
//!                 the first failure to complete is returned
//!
//! SequenceWorkflow (children run in order)
//! ├── outcomes() - one outcome per child, never short-circuits
//! └── result()   - outputs, or the first failure in declaration order
//!
//! ZipWorkflow (children run concurrently)
//! ├── outcomes() - one outcome per child, waits for all
//! └── result()   - outputs, or the first failure to complete; remaining
//!                  children are cancelled
//! ```
//!
//! Successful results always keep declaration order, whichever child
//! finished first. Nothing is memoized across calls: every call of a view
//! runs its children again.
//!
//! # Usage
//!
//! ```ignore
//! use weft_composite::{chain, zip};
//!
//! let (user, orders) = zip((fetch_user, fetch_orders)).run(cancel.clone()).await?;
//! let (saved, notified) = chain((save, notify)).run(cancel).await?;
//! ```

mod engine;
mod sequence_workflow;
mod tuple;
mod tuple_workflow;
mod zip_workflow;

pub use sequence_workflow::SequenceWorkflow;
pub use tuple::{CacheableTuple, SlotFuture, SlotValue, WorkflowTuple};
pub use tuple_workflow::{TupleWorkflow, chain, zip};
pub use weft_config::ExecutionMode;
pub use zip_workflow::ZipWorkflow;
