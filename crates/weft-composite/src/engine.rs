//! Scheduling of child workflows.
//!
//! Sequential runs await each child in declaration order on the caller's
//! task. Concurrent runs spawn every child into a [`SlotGroup`], a task
//! group owned by the calling future: dropping it aborts any member still
//! running, so no child outlives the composite call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{Id, JoinSet};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};
use weft_workflow::{Outcome, WorkflowError, checkpoint};

use crate::tuple::{SlotValue, WorkflowTuple};

/// What a concurrent run does once a child fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailurePolicy {
  /// Keep waiting until every child has finished.
  WaitForAll,
  /// Cancel the remaining children and return immediately.
  CancelSiblings,
}

/// Run children in declaration order, stopping at the first failure.
pub(crate) async fn run_sequential<T: WorkflowTuple>(
  children: &Arc<T>,
  cancel: &CancellationToken,
) -> Outcome<Vec<SlotValue>> {
  let arity = children.arity();
  let mut values = Vec::with_capacity(arity);

  for slot in 0..arity {
    checkpoint(cancel)?;
    debug!(slot, "slot_started");

    match T::launch(children, slot, cancel.clone()).await {
      Ok(value) => {
        debug!(slot, "slot_completed");
        values.push(value);
      }
      Err(e) => {
        debug!(slot, error = %e, "slot_failed");
        return Err(e);
      }
    }
  }

  Ok(values)
}

/// Run children in declaration order, capturing every outcome.
pub(crate) async fn collect_sequential<T: WorkflowTuple>(
  children: &Arc<T>,
  cancel: &CancellationToken,
) -> Vec<Outcome<SlotValue>> {
  let arity = children.arity();
  let mut outcomes = Vec::with_capacity(arity);

  for slot in 0..arity {
    let outcome = match checkpoint(cancel) {
      Ok(()) => {
        debug!(slot, "slot_started");
        T::launch(children, slot, cancel.clone()).await
      }
      Err(e) => Err(e),
    };

    debug!(slot, success = outcome.is_ok(), "slot_finished");
    outcomes.push(outcome);
  }

  outcomes
}

/// Run children concurrently.
///
/// The error returned is the one from the child that failed first in
/// completion order. Values are returned in declaration order.
pub(crate) async fn run_concurrent<T: WorkflowTuple>(
  children: &Arc<T>,
  cancel: &CancellationToken,
  policy: FailurePolicy,
) -> Outcome<Vec<SlotValue>> {
  checkpoint(cancel)?;

  let mut group = SlotGroup::spawn(children, cancel);
  let mut values: Vec<Option<SlotValue>> = std::iter::repeat_with(|| None)
    .take(children.arity())
    .collect();
  let mut first_failure: Option<(usize, WorkflowError)> = None;

  loop {
    let next = tokio::select! {
      next = group.next() => next,
      _ = cancel.cancelled() => {
        warn!("composite cancelled while children were running");
        group.abort();
        return Err(WorkflowError::Cancelled);
      }
    };

    let Some((slot, outcome)) = next else {
      break;
    };

    match outcome {
      Ok(value) => {
        debug!(slot, "slot_completed");
        values[slot] = Some(value);
      }
      Err(e) => {
        debug!(slot, error = %e, "slot_failed");
        if policy == FailurePolicy::CancelSiblings {
          group.abort();
          return Err(e);
        }
        if first_failure.is_none() {
          first_failure = Some((slot, e));
        }
      }
    }
  }

  if let Some((slot, e)) = first_failure {
    debug!(slot, "returning first failure to complete");
    return Err(e);
  }

  Ok(values.into_iter().flatten().collect())
}

/// Run children concurrently and wait for all of them, capturing every
/// outcome in declaration order.
pub(crate) async fn collect_concurrent<T: WorkflowTuple>(
  children: &Arc<T>,
  cancel: &CancellationToken,
) -> Vec<Outcome<SlotValue>> {
  let arity = children.arity();
  let mut outcomes: Vec<Option<Outcome<SlotValue>>> =
    std::iter::repeat_with(|| None).take(arity).collect();

  if checkpoint(cancel).is_ok() {
    let mut group = SlotGroup::spawn(children, cancel);

    loop {
      let next = tokio::select! {
        next = group.next() => next,
        _ = cancel.cancelled() => {
          warn!("composite cancelled while children were running");
          group.abort();
          break;
        }
      };

      let Some((slot, outcome)) = next else {
        break;
      };

      debug!(slot, success = outcome.is_ok(), "slot_finished");
      outcomes[slot] = Some(outcome);
    }
  }

  outcomes
    .into_iter()
    .map(|outcome| outcome.unwrap_or(Err(WorkflowError::Cancelled)))
    .collect()
}

/// A group of spawned children scoped to one composite call.
struct SlotGroup {
  tasks: JoinSet<(usize, Outcome<SlotValue>)>,
  slots: HashMap<Id, usize>,
  _cancel: DropGuard,
  cancel: CancellationToken,
}

impl SlotGroup {
  /// Spawn every child under a child token of `cancel`.
  fn spawn<T: WorkflowTuple>(children: &Arc<T>, cancel: &CancellationToken) -> Self {
    let group_cancel = cancel.child_token();
    let mut tasks = JoinSet::new();
    let mut slots = HashMap::new();

    for slot in 0..children.arity() {
      let slot_cancel = group_cancel.clone();
      let child = T::launch(children, slot, group_cancel.clone());

      let handle = tasks.spawn(async move {
        if let Err(e) = checkpoint(&slot_cancel) {
          return (slot, Err(e));
        }
        debug!(slot, "slot_started");
        (slot, child.await)
      });
      slots.insert(handle.id(), slot);
    }

    Self {
      tasks,
      slots,
      _cancel: group_cancel.clone().drop_guard(),
      cancel: group_cancel,
    }
  }

  /// Wait for the next child to finish, in completion order.
  ///
  /// Returns `None` once every child has finished.
  async fn next(&mut self) -> Option<(usize, Outcome<SlotValue>)> {
    match self.tasks.join_next().await? {
      Ok(finished) => Some(finished),
      Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
      Err(e) => {
        let slot = self.slots.get(&e.id()).copied()?;
        Some((slot, Err(WorkflowError::Cancelled)))
      }
    }
  }

  /// Cancel and abort every child still running.
  fn abort(&mut self) {
    self.cancel.cancel();
    self.tasks.abort_all();
  }
}
