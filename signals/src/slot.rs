use std::sync::Arc;

use crate::policy::{ConcurrentEmit, Policy, SerializedEmit, Unsync};

/// Trait for types that can be converted into a slot of a `Signal<A, R, P>`.
///
/// Implemented for:
/// - closures `Fn(&A) -> R`
/// - [`Method`], a member operation bound to a shared target
/// - `std::sync::mpsc::Sender<A>` and (with the `tokio` feature) `tokio::sync::mpsc::UnboundedSender<A>`,
///   which receive a clone of every emitted value
///
/// The thread-safe policies additionally require `Send + Sync`.
pub trait IntoSlot<A: 'static, R: 'static, P: Policy> {
    fn into_slot(self) -> P::Slot<A, R>;
}

/// A member operation bound to its target, usable as a slot.
///
/// ```rust
/// use ankurah_slots::*;
/// use std::sync::{Arc, Mutex};
///
/// struct Counter(Mutex<u32>);
/// impl Counter {
///     fn bump(&self, by: &u32) { *self.0.lock().unwrap() += by }
/// }
///
/// let counter = Arc::new(Counter(Mutex::new(0)));
/// let signal = Signal::<u32>::new();
/// let _connection = signal.connect_method(counter.clone(), Counter::bump);
/// signal.emit(3);
/// assert_eq!(*counter.0.lock().unwrap(), 3);
/// ```
pub struct Method<T, M> {
    target: Arc<T>,
    method: M,
}

impl<T, M> Method<T, M> {
    pub fn new(target: Arc<T>, method: M) -> Self { Self { target, method } }
}

macro_rules! impl_into_slot {
    ($policy:ty $(, $bound:ident)*) => {
        impl<F, A: 'static, R: 'static> IntoSlot<A, R, $policy> for F
        where F: Fn(&A) -> R $(+ $bound)* + 'static
        {
            fn into_slot(self) -> <$policy as Policy>::Slot<A, R> { Box::new(self) }
        }

        impl<T, M, A: 'static, R: 'static> IntoSlot<A, R, $policy> for Method<T, M>
        where
            T: $($bound +)* 'static,
            M: Fn(&T, &A) -> R $(+ $bound)* + 'static,
        {
            fn into_slot(self) -> <$policy as Policy>::Slot<A, R> {
                let Method { target, method } = self;
                Box::new(move |args: &A| method(&target, args))
            }
        }

        impl<A> IntoSlot<A, (), $policy> for std::sync::mpsc::Sender<A>
        where A: Clone $(+ $bound)* + 'static
        {
            fn into_slot(self) -> <$policy as Policy>::Slot<A, ()> {
                Box::new(move |args: &A| {
                    let _ = self.send(args.clone()); // Ignore send errors
                })
            }
        }

        #[cfg(feature = "tokio")]
        impl<A> IntoSlot<A, (), $policy> for tokio::sync::mpsc::UnboundedSender<A>
        where A: Clone $(+ $bound)* + 'static
        {
            fn into_slot(self) -> <$policy as Policy>::Slot<A, ()> {
                Box::new(move |args: &A| {
                    let _ = self.send(args.clone()); // Ignore send errors
                })
            }
        }
    };
}

impl_into_slot!(Unsync);
impl_into_slot!(ConcurrentEmit, Send, Sync);
impl_into_slot!(SerializedEmit, Send, Sync);
