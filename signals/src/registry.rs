use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::{context::DispatchFrame, error::EmitError, lock::SlotLock, policy::Policy};

/// Stable identity of a connected slot.
///
/// Ids only ever grow, so ordering by id is registration order, and removing one slot leaves
/// every other id valid.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotId(u64);

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

pub type SlotMap<A, R, P> = BTreeMap<SlotId, <P as Policy>::Slot<A, R>>;

/// A mutation requested by a slot of the signal that is dispatching it
pub enum Deferred<S> {
    Insert(SlotId, S),
    Remove(SlotId),
}

/// The shared state behind a [`Signal`](crate::Signal): the slot container and its locks.
pub struct Registry<A: 'static, R: 'static, P: Policy> {
    slots: P::Lock<SlotMap<A, R, P>>,
    deferred: P::Lock<Vec<Deferred<P::Slot<A, R>>>>,
    has_deferred: AtomicBool,
    next_id: AtomicU64,
}

impl<A: 'static, R: 'static, P: Policy> Registry<A, R, P> {
    pub fn new() -> Self {
        Self {
            slots: SlotLock::new(BTreeMap::new()),
            deferred: SlotLock::new(Vec::new()),
            has_deferred: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
        }
    }

    /// Unique for as long as the registry is alive
    pub fn key(&self) -> usize { self as *const Self as usize }

    /// Appends a slot and returns the action which will remove it again
    pub fn insert(self: &Arc<Self>, slot: P::Slot<A, R>) -> P::Detach {
        let id = SlotId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if DispatchFrame::defer(self.key()) {
            debug!("Signal {:#x} deferring connect of slot {} until dispatch completes", self.key(), id);
            self.queue(Deferred::Insert(id, slot));
        } else {
            self.mutate(|slots| slots.insert(id, slot));
            trace!("Signal {:#x} connected slot {}", self.key(), id);
        }
        P::detacher(Arc::downgrade(self), id)
    }

    pub fn remove(&self, id: SlotId) {
        if DispatchFrame::defer(self.key()) {
            debug!("Signal {:#x} deferring disconnect of slot {} until dispatch completes", self.key(), id);
            self.queue(Deferred::Remove(id));
        } else if self.mutate(|slots| slots.remove(&id)).is_some() {
            trace!("Signal {:#x} disconnected slot {}", self.key(), id);
        }
    }

    /// Runs `f` over the slots while holding the dispatch lock.
    ///
    /// Fails if this signal is already dispatching on the current thread: taking the lock a
    /// second time could deadlock. Mutations deferred by slots called from `f` are applied
    /// once the lock is released, even if a slot panics.
    pub fn dispatch<T, E>(&self, f: impl FnOnce(&SlotMap<A, R, P>) -> T) -> Result<T, EmitError<E>> {
        let frame = DispatchFrame::enter(self.key()).ok_or(EmitError::Reentrant)?;
        let _settle = Settle { registry: self, frame: Some(frame) };
        // the emit guard is dropped before `_settle`, including while unwinding
        let slots = self.slots.emit();
        Ok(f(&slots))
    }

    /// Exclusive access to the slots, with any deferred mutations applied first
    fn mutate<T>(&self, f: impl FnOnce(&mut SlotMap<A, R, P>) -> T) -> T {
        let mut slots = self.slots.write();
        if self.has_deferred.swap(false, Ordering::AcqRel) {
            let ops = std::mem::take(&mut *self.deferred.write());
            debug!("Signal {:#x} applying {} deferred mutations", self.key(), ops.len());
            for op in ops {
                match op {
                    Deferred::Insert(id, slot) => {
                        slots.insert(id, slot);
                    }
                    Deferred::Remove(id) => {
                        slots.remove(&id);
                    }
                }
            }
        }
        f(&mut slots)
    }

    fn queue(&self, op: Deferred<P::Slot<A, R>>) {
        self.deferred.write().push(op);
        self.has_deferred.store(true, Ordering::Release);
    }
}

/// Ends a dispatch frame and applies whatever its slots deferred
struct Settle<'a, A: 'static, R: 'static, P: Policy> {
    registry: &'a Registry<A, R, P>,
    frame: Option<DispatchFrame>,
}

impl<A: 'static, R: 'static, P: Policy> Drop for Settle<'_, A, R, P> {
    fn drop(&mut self) {
        if let Some(frame) = self.frame.take() {
            if frame.finish() {
                if std::thread::panicking() {
                    debug!("Signal {:#x} slot panicked, applying its deferred mutations", self.registry.key());
                }
                self.registry.mutate(|_| ());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ConcurrentEmit, Unsync};
    use std::convert::Infallible;

    fn ids<A: 'static, R: 'static, P: Policy>(registry: &Registry<A, R, P>) -> Vec<SlotId> {
        registry.dispatch::<_, Infallible>(|slots| slots.keys().copied().collect()).unwrap()
    }

    #[test]
    fn test_ids_survive_unrelated_removal() {
        let registry = Arc::new(Registry::<(), (), ConcurrentEmit>::new());
        let first = registry.insert(Box::new(|_: &()| {}));
        let second = registry.insert(Box::new(|_: &()| {}));
        let _third = registry.insert(Box::new(|_: &()| {}));

        second();
        assert_eq!(ids(&registry), vec![SlotId(0), SlotId(2)]);

        first();
        assert_eq!(ids(&registry), vec![SlotId(2)]);
    }

    #[test]
    fn test_detacher_is_inert_after_registry_drop() {
        let registry = Arc::new(Registry::<u8, (), Unsync>::new());
        let detach = registry.insert(Box::new(|_: &u8| {}));
        drop(registry);
        detach();
    }

    #[test]
    fn test_mutation_inside_dispatch_is_deferred() {
        let registry = Arc::new(Registry::<(), (), Unsync>::new());
        registry.insert(Box::new(|_: &()| {}));

        let seen = registry
            .dispatch::<_, Infallible>(|slots| {
                registry.insert(Box::new(|_: &()| {}));
                registry.remove(SlotId(0));
                slots.len()
            })
            .unwrap();

        assert_eq!(seen, 1);
        assert_eq!(ids(&registry), vec![SlotId(1)]);
    }

    #[test]
    fn test_deferred_mutation_applied_when_dispatch_panics() {
        let registry = Arc::new(Registry::<(), (), Unsync>::new());
        registry.insert(Box::new(|_: &()| {}));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = registry.dispatch::<(), Infallible>(|_| {
                registry.remove(SlotId(0));
                panic!("slot failed");
            });
        }));

        assert!(result.is_err());
        assert!(ids(&registry).is_empty());
    }

    #[test]
    fn test_nested_dispatch_is_rejected() {
        let registry = Registry::<(), (), ConcurrentEmit>::new();
        let nested = registry.dispatch::<_, Infallible>(|_| registry.dispatch::<_, Infallible>(|_| ()).is_err()).unwrap();
        assert!(nested);
    }
}
