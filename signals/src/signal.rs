use std::convert::Infallible;
use std::sync::Arc;

use crate::{
    connection::{Connection, ScopedConnection},
    emission::Emission,
    error::EmitError,
    policy::{ConcurrentEmit, Policy, SerializedEmit, Unsync},
    registry::Registry,
    slot::{IntoSlot, Method},
};

/// A synchronous callback registry.
///
/// Slots are called with `&A` and return `R`. Use a tuple for `A` when the event has several
/// arguments. `P` selects the concurrency mode; see [`Policy`].
///
/// Slots run on the emitting thread, in the order they were connected, while the signal holds
/// its dispatch lock. A slot may connect or disconnect slots of the signal that is calling it;
/// those changes take effect once the current dispatch is over. A slot may not emit the signal
/// that is calling it.
pub struct Signal<A: 'static, R: 'static = (), P: Policy = ConcurrentEmit>(Arc<Registry<A, R, P>>);

/// Single-threaded signal without any locking
pub type UnsyncSignal<A, R = ()> = Signal<A, R, Unsync>;
/// Thread-safe signal whose emits may overlap each other
pub type SyncSignal<A, R = ()> = Signal<A, R, ConcurrentEmit>;
/// Thread-safe signal which runs one emit, connect or disconnect at a time
pub type SerialSignal<A, R = ()> = Signal<A, R, SerializedEmit>;

impl<A: 'static, R: 'static, P: Policy> Default for Signal<A, R, P> {
    fn default() -> Self { Self::new() }
}

impl<A: 'static, R: 'static, P: Policy> Signal<A, R, P> {
    pub fn new() -> Self { Self(Arc::new(Registry::new())) }

    /// Connects a slot after all currently connected slots
    pub fn connect<S>(&self, slot: S) -> Connection<P>
    where S: IntoSlot<A, R, P> {
        Connection::new(self.0.insert(slot.into_slot()))
    }

    /// Connects a slot which is disconnected when the returned guard is dropped
    pub fn scoped_connect<S>(&self, slot: S) -> ScopedConnection<P>
    where S: IntoSlot<A, R, P> {
        self.connect(slot).scoped()
    }

    /// Connects `method`, called on `target`
    pub fn connect_method<T, M>(&self, target: Arc<T>, method: M) -> Connection<P>
    where Method<T, M>: IntoSlot<A, R, P> {
        self.connect(Method::new(target, method))
    }

    pub fn scoped_connect_method<T, M>(&self, target: Arc<T>, method: M) -> ScopedConnection<P>
    where Method<T, M>: IntoSlot<A, R, P> {
        self.scoped_connect(Method::new(target, method))
    }

    /// Calls every connected slot with `args`, discarding the results.
    ///
    /// # Panics
    /// If called from within one of this signal's own slots, or if a slot panics.
    pub fn emit(&self, args: A) {
        let dispatched = self.0.dispatch::<_, Infallible>(|slots| {
            for slot in slots.values() {
                slot(&args);
            }
        });
        if let Err(e) = dispatched {
            panic!("{e}");
        }
    }

    /// Returns an iterator which calls the slots one at a time as it is advanced, yielding their results.
    ///
    /// The slots are the ones connected at the time of this call, minus any which get
    /// disconnected before the iterator reaches them.
    ///
    /// # Panics
    /// If called (or advanced) from within one of this signal's own slots.
    pub fn emit_iterate(&self, args: A) -> Emission<'_, A, R, P> {
        match self.0.dispatch::<_, Infallible>(|slots| slots.keys().copied().collect::<Vec<_>>()) {
            Ok(ids) => Emission::new(&self.0, args, ids),
            Err(e) => panic!("{e}"),
        }
    }

    /// Number of connected slots
    ///
    /// # Panics
    /// If called from within one of this signal's own slots.
    pub fn len(&self) -> usize {
        match self.0.dispatch::<_, Infallible>(|slots| slots.len()) {
            Ok(len) => len,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<A: 'static, T: 'static, E: 'static, P: Policy> Signal<A, Result<T, E>, P> {
    /// Calls the slots in order until one of them fails.
    ///
    /// Slots after the failing one are not called. Successful results are discarded.
    pub fn try_emit(&self, args: A) -> Result<(), EmitError<E>> {
        self.0.dispatch::<_, E>(|slots| -> Result<(), EmitError<E>> {
            for (position, slot) in slots.values().enumerate() {
                slot(&args).map_err(|source| EmitError::Slot { position, source })?;
            }
            Ok(())
        })?
    }
}

impl<A: 'static, R: 'static, P: Policy> std::fmt::Debug for Signal<A, R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Signal");
        match self.0.dispatch::<_, Infallible>(|slots| slots.len()) {
            Ok(len) => debug.field("slots", &len),
            Err(_) => debug.field("slots", &"<dispatching>"),
        };
        debug.finish()
    }
}
