use std::sync::Weak;

use crate::{
    lock::{ExclusiveEmitLock, NoLock, SharedEmitLock, SlotLock},
    registry::{Registry, SlotId},
};

mod sealed {
    pub trait Sealed {}
}

/// The concurrency mode of a [`Signal`](crate::Signal), fixed by its type.
///
/// This is a closed set:
/// - [`Unsync`] - no locking; the signal is neither `Send` nor `Sync`
/// - [`ConcurrentEmit`] - exclusive lock for connect/disconnect, shared lock for emit
/// - [`SerializedEmit`] - exclusive lock for everything
pub trait Policy: sealed::Sealed + Sized + 'static {
    /// Lock guarding the slot container
    type Lock<T>: SlotLock<T>;
    /// Stored slot
    type Slot<A: 'static, R: 'static>: Fn(&A) -> R;
    /// Stored detachment action of a connection
    type Detach: FnOnce();

    #[doc(hidden)]
    fn detacher<A: 'static, R: 'static>(registry: Weak<Registry<A, R, Self>>, id: SlotId) -> Self::Detach;
}

/// Single-threaded signals. Slots need not be `Send` or `Sync`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsync;

/// Thread-safe signals whose emits may run concurrently with each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrentEmit;

/// Thread-safe signals where at most one emit, connect or disconnect runs at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerializedEmit;

impl sealed::Sealed for Unsync {}
impl sealed::Sealed for ConcurrentEmit {}
impl sealed::Sealed for SerializedEmit {}

impl Policy for Unsync {
    type Lock<T> = NoLock<T>;
    type Slot<A: 'static, R: 'static> = Box<dyn Fn(&A) -> R>;
    type Detach = Box<dyn FnOnce()>;

    fn detacher<A: 'static, R: 'static>(registry: Weak<Registry<A, R, Self>>, id: SlotId) -> Self::Detach {
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }
}

impl Policy for ConcurrentEmit {
    type Lock<T> = SharedEmitLock<T>;
    type Slot<A: 'static, R: 'static> = Box<dyn Fn(&A) -> R + Send + Sync>;
    type Detach = Box<dyn FnOnce() + Send + Sync>;

    fn detacher<A: 'static, R: 'static>(registry: Weak<Registry<A, R, Self>>, id: SlotId) -> Self::Detach {
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }
}

impl Policy for SerializedEmit {
    type Lock<T> = ExclusiveEmitLock<T>;
    type Slot<A: 'static, R: 'static> = Box<dyn Fn(&A) -> R + Send + Sync>;
    type Detach = Box<dyn FnOnce() + Send + Sync>;

    fn detacher<A: 'static, R: 'static>(registry: Weak<Registry<A, R, Self>>, id: SlotId) -> Self::Detach {
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.remove(id);
            }
        })
    }
}
