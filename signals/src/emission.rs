use std::convert::Infallible;
use std::iter::FusedIterator;

use crate::{
    policy::Policy,
    registry::{Registry, SlotId},
};

/// Lazy dispatch over the slots of a signal, created by [`Signal::emit_iterate`](crate::Signal::emit_iterate).
///
/// Each call to `next` locks the signal, calls one slot with the stored arguments and unlocks
/// it again. Nothing is called until the iterator is advanced.
///
/// ```rust
/// use ankurah_slots::*;
///
/// let signal = Signal::<(), i32>::new();
/// let _five = signal.connect(|_: &()| 5);
/// let _one = signal.connect(|_: &()| 1);
/// assert_eq!(signal.emit_iterate(()).sum::<i32>(), 6);
/// ```
pub struct Emission<'a, A: 'static, R: 'static, P: Policy> {
    registry: &'a Registry<A, R, P>,
    args: A,
    remaining: std::vec::IntoIter<SlotId>,
}

impl<'a, A: 'static, R: 'static, P: Policy> Emission<'a, A, R, P> {
    pub(crate) fn new(registry: &'a Registry<A, R, P>, args: A, ids: Vec<SlotId>) -> Self {
        Self { registry, args, remaining: ids.into_iter() }
    }

    /// The arguments every slot is called with
    pub fn args(&self) -> &A { &self.args }
}

impl<A: 'static, R: 'static, P: Policy> Iterator for Emission<'_, A, R, P> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        let args = &self.args;
        for id in self.remaining.by_ref() {
            // slots disconnected since the emission was created are skipped
            match self.registry.dispatch::<_, Infallible>(|slots| slots.get(&id).map(|slot| slot(args))) {
                Ok(Some(result)) => return Some(result),
                Ok(None) => continue,
                Err(e) => panic!("{e}"),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (0, Some(self.remaining.len())) }
}

impl<A: 'static, R: 'static, P: Policy> FusedIterator for Emission<'_, A, R, P> {}

impl<A: 'static, R: 'static, P: Policy> std::fmt::Debug for Emission<'_, A, R, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emission").field("remaining", &self.remaining.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_creation_calls_nothing() {
        let signal = UnsyncSignal::<u8, u8>::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let _connections: Vec<_> = (0..3u8)
            .map(|n| {
                let calls = calls.clone();
                signal.connect(move |value: &u8| {
                    calls.borrow_mut().push(n);
                    n + value
                })
            })
            .collect();

        let mut emission = signal.emit_iterate(10);
        assert!(calls.borrow().is_empty());
        assert_eq!(emission.size_hint(), (0, Some(3)));

        assert_eq!(emission.next(), Some(10));
        assert_eq!(*calls.borrow(), vec![0]);
        assert_eq!(emission.next(), Some(11));
        assert_eq!(*calls.borrow(), vec![0, 1]);
        assert_eq!(emission.collect::<Vec<_>>(), vec![12]);
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_removed_before_reached_is_skipped() {
        let signal = UnsyncSignal::<(), &'static str>::new();
        let _a = signal.connect(|_: &()| "a");
        let mut b = signal.connect(|_: &()| "b");
        let _c = signal.connect(|_: &()| "c");

        let mut emission = signal.emit_iterate(());
        assert_eq!(emission.next(), Some("a"));
        b.disconnect();
        // connected after creation, so not visited
        let _d = signal.connect(|_: &()| "d");
        assert_eq!(emission.next(), Some("c"));
        assert_eq!(emission.next(), None);
        assert_eq!(emission.next(), None);
    }

    #[test]
    fn test_empty_signal_yields_nothing() {
        let signal = Signal::<(), i32>::new();
        assert_eq!(signal.emit_iterate(()).count(), 0);
    }
}
