use std::cell::{Ref, RefCell, RefMut};
use std::ops::{Deref, DerefMut};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Uniform locking interface over the slot container.
///
/// `emit` is taken for dispatch, `write` for registration and removal. Whether `emit` is
/// shared or exclusive is what distinguishes the lock flavours.
pub trait SlotLock<T> {
    type Emit<'a>: Deref<Target = T>
    where Self: 'a;
    type Write<'a>: DerefMut<Target = T>
    where Self: 'a;

    fn new(value: T) -> Self;

    /// Lock for dispatch
    fn emit(&self) -> Self::Emit<'_>;

    /// Lock for mutation - always exclusive
    fn write(&self) -> Self::Write<'_>;
}

/// Single-threaded "lock". No synchronization at all; the owning signal is `!Sync`.
pub struct NoLock<T>(RefCell<T>);

/// Readers-writer lock which lets dispatches overlap each other, but never a mutation.
pub struct SharedEmitLock<T>(RwLock<T>);

/// Readers-writer lock which serializes dispatches with each other and with mutations.
pub struct ExclusiveEmitLock<T>(RwLock<T>);

impl<T> SlotLock<T> for NoLock<T> {
    type Emit<'a>
        = Ref<'a, T>
    where Self: 'a;
    type Write<'a>
        = RefMut<'a, T>
    where Self: 'a;

    fn new(value: T) -> Self { Self(RefCell::new(value)) }
    fn emit(&self) -> Ref<'_, T> { self.0.borrow() }
    fn write(&self) -> RefMut<'_, T> { self.0.borrow_mut() }
}

// A panicking slot poisons the lock while the container is intact, so poisoning is ignored.
impl<T> SlotLock<T> for SharedEmitLock<T> {
    type Emit<'a>
        = RwLockReadGuard<'a, T>
    where Self: 'a;
    type Write<'a>
        = RwLockWriteGuard<'a, T>
    where Self: 'a;

    fn new(value: T) -> Self { Self(RwLock::new(value)) }
    fn emit(&self) -> RwLockReadGuard<'_, T> { self.0.read().unwrap_or_else(PoisonError::into_inner) }
    fn write(&self) -> RwLockWriteGuard<'_, T> { self.0.write().unwrap_or_else(PoisonError::into_inner) }
}

impl<T> SlotLock<T> for ExclusiveEmitLock<T> {
    type Emit<'a>
        = RwLockWriteGuard<'a, T>
    where Self: 'a;
    type Write<'a>
        = RwLockWriteGuard<'a, T>
    where Self: 'a;

    fn new(value: T) -> Self { Self(RwLock::new(value)) }
    fn emit(&self) -> RwLockWriteGuard<'_, T> { self.0.write().unwrap_or_else(PoisonError::into_inner) }
    fn write(&self) -> RwLockWriteGuard<'_, T> { self.0.write().unwrap_or_else(PoisonError::into_inner) }
}
