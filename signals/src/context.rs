use std::cell::RefCell;

struct Frame {
    key: usize,
    deferred: bool,
}

// Thread-local stack of the signals currently dispatching on this thread (outermost first)
thread_local! {
    static DISPATCH_STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Marks a signal as dispatching on the current thread for as long as the frame is alive.
///
/// Slots run while their signal holds its dispatch lock. Any mutation they request of that
/// same signal must not try to take the lock again, so the registry asks [`DispatchFrame::defer`]
/// first and queues the mutation instead.
pub(crate) struct DispatchFrame {
    key: usize,
}

impl DispatchFrame {
    /// Pushes a frame for `key`, or returns `None` if that signal is already dispatching here
    pub fn enter(key: usize) -> Option<Self> {
        DISPATCH_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|frame| frame.key == key) {
                return None;
            }
            stack.push(Frame { key, deferred: false });
            Some(Self { key })
        })
    }

    /// If the signal identified by `key` is dispatching on the current thread, records that
    /// a mutation was deferred and returns true
    pub fn defer(key: usize) -> bool {
        DISPATCH_STACK.with(|stack| match stack.borrow_mut().iter_mut().find(|frame| frame.key == key) {
            Some(frame) => {
                frame.deferred = true;
                true
            }
            None => false,
        })
    }

    /// Pops the frame, returning whether any mutation was deferred while it was active
    pub fn finish(self) -> bool {
        DISPATCH_STACK.with(|stack| stack.borrow().iter().rev().find(|frame| frame.key == self.key).is_some_and(|frame| frame.deferred))
    }
}

impl Drop for DispatchFrame {
    fn drop(&mut self) {
        DISPATCH_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            // Frames are scoped, so ours is almost always the last one
            if stack.last().is_some_and(|frame| frame.key == self.key) {
                stack.pop();
                return;
            }
            stack.retain(|frame| frame.key != self.key);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_frames() {
        let outer = DispatchFrame::enter(1).expect("first entry");
        assert!(DispatchFrame::enter(1).is_none());

        {
            let inner = DispatchFrame::enter(2).expect("different signal");
            assert!(DispatchFrame::defer(2));
            assert!(inner.finish());
        }
        assert!(!DispatchFrame::defer(2));

        assert!(!outer.finish());
        assert!(!DispatchFrame::defer(1));
        assert!(DispatchFrame::enter(1).is_some());
    }

    #[test]
    fn test_frames_are_per_thread() {
        let frame = DispatchFrame::enter(7).unwrap();
        std::thread::spawn(|| assert!(!DispatchFrame::defer(7))).join().unwrap();
        assert!(!frame.finish());
    }
}
