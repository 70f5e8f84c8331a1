//! The call-order indexed hook store.
//!
//! Slot `i` belongs to the `i`-th hook call of every pass. The store cannot tell
//! whether callers keep that order; when a slot turns out to hold something
//! other than what the reading hook expects, it is treated as vacant and
//! overwritten.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::value::Value;

/// Dependency list persisted by an effect slot. `None` means "every pass".
pub(crate) type Deps = Option<Vec<Value>>;

#[derive(Debug, Default)]
enum Slot {
    #[default]
    Vacant,
    State(Box<dyn Any>),
    Effect(Deps),
}

/// Ordered slots, allocated lazily and never shrunk.
#[derive(Debug, Default)]
pub(crate) struct HookStore {
    slots: Vec<Slot>,
}

impl HookStore {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot {
        if index >= self.slots.len() {
            tracing::trace!(slot = index, "allocating hook slot");
            self.slots.resize_with(index + 1, Slot::default);
        }
        &mut self.slots[index]
    }

    /// Reads the state at `index`, initializing it on first access.
    pub(crate) fn state<T, F>(&mut self, index: usize, init: F) -> T
    where
        T: Clone + 'static,
        F: FnOnce() -> T,
    {
        let slot = self.slot_mut(index);
        if let Slot::State(value) = slot {
            if let Some(value) = value.downcast_ref::<T>() {
                return value.clone();
            }
        }
        if !matches!(slot, Slot::Vacant) {
            tracing::warn!(
                slot = index,
                expected = type_name::<T>(),
                "hook slot held a different kind of value; hooks were called out of order"
            );
        }
        let value = init();
        *slot = Slot::State(Box::new(value.clone()));
        value
    }

    /// Stores `next` unless it equals the current value. Returns whether the
    /// slot changed.
    pub(crate) fn replace_state<T>(&mut self, index: usize, next: T) -> bool
    where
        T: PartialEq + 'static,
    {
        let slot = self.slot_mut(index);
        if let Slot::State(current) = slot {
            if current.downcast_ref::<T>() == Some(&next) {
                return false;
            }
        }
        *slot = Slot::State(Box::new(next));
        true
    }

    /// Clones the current state so an updater can derive the next value.
    pub(crate) fn peek_state<T: Clone + 'static>(&self, index: usize) -> Option<T> {
        match self.slots.get(index) {
            Some(Slot::State(value)) => value.downcast_ref::<T>().cloned(),
            _ => None,
        }
    }

    /// Decides whether the effect at `index` must run for `deps`.
    ///
    /// Vacant slots, effects registered without dependencies, and lists whose
    /// elements differ pairwise all count as changed. Lists of different
    /// length are only compared up to the shorter one.
    pub(crate) fn effect_changed(&mut self, index: usize, deps: Option<&[Value]>) -> bool {
        match self.slot_mut(index) {
            Slot::Effect(Some(previous)) => deps.is_none_or(|deps| {
                previous
                    .iter()
                    .zip(deps)
                    .any(|(previous, next)| previous != next)
            }),
            Slot::Effect(None) | Slot::Vacant => true,
            Slot::State(_) => {
                tracing::warn!(
                    slot = index,
                    "effect slot held state; hooks were called out of order"
                );
                true
            }
        }
    }

    /// Persists the dependency list of an effect that was queued.
    pub(crate) fn commit_deps(&mut self, index: usize, deps: Deps) {
        *self.slot_mut(index) = Slot::Effect(deps);
    }
}
