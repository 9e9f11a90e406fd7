//! Fixed-arity collections of child workflows.
//!
//! The engine schedules children by position. Each child's output is boxed
//! into a [`SlotValue`] while in flight and unboxed back into its declared
//! type when the result tuple is assembled, so one engine serves every arity.

use std::any::Any;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use weft_cache::CachedWorkflow;
use weft_workflow::{Outcome, Workflow};

/// A child output while it is held by the engine.
pub type SlotValue = Box<dyn Any + Send>;

/// A running child, resolving to its boxed output.
pub type SlotFuture = BoxFuture<'static, Outcome<SlotValue>>;

/// An ordered, fixed-size collection of child workflows.
///
/// Implemented for tuples of up to twelve workflows, each with its own
/// output type, and for `Vec<W>` of same-typed workflows.
pub trait WorkflowTuple: Send + Sync + 'static {
  /// Outputs of every child, in declaration order.
  type Output: Send + 'static;

  /// Captured outcome of every child, in declaration order.
  type Outcomes: Send + 'static;

  /// Number of children.
  fn arity(&self) -> usize;

  /// Start the child at `index`.
  fn launch(children: &Arc<Self>, index: usize, cancel: CancellationToken) -> SlotFuture;

  /// Unbox one value per child into the output tuple.
  fn assemble(values: Vec<SlotValue>) -> Self::Output;

  /// Unbox one outcome per child into the outcome tuple.
  fn assemble_outcomes(outcomes: Vec<Outcome<SlotValue>>) -> Self::Outcomes;
}

/// Children whose outputs can be memoized.
///
/// The children are first moved behind shared pointers. Each composite call
/// then builds its own [`CachedWorkflow`] around every shared child, so
/// outcomes are memoized for that one call only.
pub trait CacheableTuple: WorkflowTuple {
  /// The same children, each behind an `Arc`.
  type Shared: WorkflowTuple<Output = Self::Output, Outcomes = Self::Outcomes>;

  /// The shared children, each wrapped in a fresh [`CachedWorkflow`].
  type Cached: WorkflowTuple<Output = Self::Output, Outcomes = Self::Outcomes>;

  fn into_shared(self) -> Self::Shared;

  fn cached(shared: &Self::Shared) -> Self::Cached;
}

fn boxed<T: Send + 'static>(output: T) -> SlotValue {
  Box::new(output)
}

fn unbox<T: 'static>(value: Option<SlotValue>) -> T {
  match value.map(|value| value.downcast::<T>()) {
    Some(Ok(value)) => *value,
    _ => unreachable!("slot holds a value of its declared type"),
  }
}

fn unbox_outcome<T: 'static>(outcome: Option<Outcome<SlotValue>>) -> Outcome<T> {
  match outcome {
    Some(Ok(value)) => Ok(unbox(Some(value))),
    Some(Err(e)) => Err(e),
    None => unreachable!("every slot has an outcome"),
  }
}

macro_rules! impl_workflow_tuple {
  ($arity:literal; $($W:ident $idx:tt),+) => {
    impl<$($W),+> WorkflowTuple for ($($W,)+)
    where
      $($W: Workflow + 'static,)+
    {
      type Output = ($(<$W as Workflow>::Output,)+);
      type Outcomes = ($(Outcome<<$W as Workflow>::Output>,)+);

      fn arity(&self) -> usize {
        $arity
      }

      fn launch(children: &Arc<Self>, index: usize, cancel: CancellationToken) -> SlotFuture {
        let children = Arc::clone(children);
        match index {
          $($idx => Box::pin(async move { children.$idx.run(cancel).await.map(boxed) }),)+
          _ => unreachable!("slot {} out of range for {} children", index, $arity),
        }
      }

      fn assemble(values: Vec<SlotValue>) -> Self::Output {
        let mut values = values.into_iter();
        ($(unbox::<<$W as Workflow>::Output>(values.next()),)+)
      }

      fn assemble_outcomes(outcomes: Vec<Outcome<SlotValue>>) -> Self::Outcomes {
        let mut outcomes = outcomes.into_iter();
        ($(unbox_outcome::<<$W as Workflow>::Output>(outcomes.next()),)+)
      }
    }

    impl<$($W),+> CacheableTuple for ($($W,)+)
    where
      $($W: Workflow + 'static, <$W as Workflow>::Output: Clone + Sync,)+
    {
      type Shared = ($(Arc<$W>,)+);
      type Cached = ($(CachedWorkflow<Arc<$W>>,)+);

      fn into_shared(self) -> Self::Shared {
        ($(Arc::new(self.$idx),)+)
      }

      fn cached(shared: &Self::Shared) -> Self::Cached {
        ($(CachedWorkflow::new(Arc::clone(&shared.$idx)),)+)
      }
    }
  };
}

impl_workflow_tuple!(1; A 0);
impl_workflow_tuple!(2; A 0, B 1);
impl_workflow_tuple!(3; A 0, B 1, C 2);
impl_workflow_tuple!(4; A 0, B 1, C 2, D 3);
impl_workflow_tuple!(5; A 0, B 1, C 2, D 3, E 4);
impl_workflow_tuple!(6; A 0, B 1, C 2, D 3, E 4, F 5);
impl_workflow_tuple!(7; A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_workflow_tuple!(8; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_workflow_tuple!(9; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_workflow_tuple!(10; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_workflow_tuple!(11; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_workflow_tuple!(12; A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

impl<W: Workflow + 'static> WorkflowTuple for Vec<W> {
  type Output = Vec<W::Output>;
  type Outcomes = Vec<Outcome<W::Output>>;

  fn arity(&self) -> usize {
    self.len()
  }

  fn launch(children: &Arc<Self>, index: usize, cancel: CancellationToken) -> SlotFuture {
    let children = Arc::clone(children);
    Box::pin(async move { children[index].run(cancel).await.map(boxed) })
  }

  fn assemble(values: Vec<SlotValue>) -> Self::Output {
    values
      .into_iter()
      .map(|value| unbox::<W::Output>(Some(value)))
      .collect()
  }

  fn assemble_outcomes(outcomes: Vec<Outcome<SlotValue>>) -> Self::Outcomes {
    outcomes
      .into_iter()
      .map(|outcome| unbox_outcome::<W::Output>(Some(outcome)))
      .collect()
  }
}

impl<W> CacheableTuple for Vec<W>
where
  W: Workflow + 'static,
  W::Output: Clone + Sync,
{
  type Shared = Vec<Arc<W>>;
  type Cached = Vec<CachedWorkflow<Arc<W>>>;

  fn into_shared(self) -> Self::Shared {
    self.into_iter().map(Arc::new).collect()
  }

  fn cached(shared: &Self::Shared) -> Self::Cached {
    shared
      .iter()
      .map(|child| CachedWorkflow::new(Arc::clone(child)))
      .collect()
  }
}
