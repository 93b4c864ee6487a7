use std::cell::RefCell;
use std::rc::Rc;

/// Holder for a callback that reschedules itself each frame.
///
/// The callback keeps a clone of its own slot, which is a reference cycle.
/// Whoever ends the loop must call [`FrameSlot::release`] or the callback and
/// everything it captured stay alive.
pub struct FrameSlot<T> {
    inner: Rc<RefCell<Option<T>>>,
}

impl<T> Clone for FrameSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for FrameSlot<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(None)),
        }
    }
}

impl<T> FrameSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, callback: T) {
        *self.inner.borrow_mut() = Some(callback);
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.inner.borrow().as_ref().map(f)
    }

    /// Takes the callback out, breaking the cycle.
    pub fn release(&self) -> Option<T> {
        self.inner.borrow_mut().take()
    }

    pub fn is_set(&self) -> bool {
        self.inner.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Callback = Rc<dyn Fn() -> bool>;

    // Stands in for the browser: holds its own reference while a frame runs.
    fn drive(slot: &FrameSlot<Callback>, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            let Some(callback) = slot.with(Rc::clone) else {
                break;
            };
            frames += 1;
            if !callback() {
                break;
            }
        }
        frames
    }

    fn looping(slot: &FrameSlot<Callback>, state: Rc<Vec<u8>>, stop_after: usize) {
        let own = slot.clone();
        let count = Cell::new(0);
        slot.set(Rc::new(move || {
            let _canvas = &state;
            count.set(count.get() + 1);
            if count.get() == stop_after {
                own.release();
                return false;
            }
            true
        }));
    }

    #[test]
    fn finished_loop_frees_its_captures() {
        let slot = FrameSlot::new();
        let state = Rc::new(vec![0u8; 16]);
        let watch = Rc::downgrade(&state);
        looping(&slot, state, 3);

        assert_eq!(drive(&slot, 100), 3);
        assert!(!slot.is_set());
        assert!(watch.upgrade().is_none());
    }

    #[test]
    fn running_loop_keeps_its_captures() {
        let slot = FrameSlot::new();
        let state = Rc::new(vec![0u8; 16]);
        let watch = Rc::downgrade(&state);
        looping(&slot, state, usize::MAX);

        assert_eq!(drive(&slot, 5), 5);
        assert!(watch.upgrade().is_some());
        drop(slot.release());
        assert!(watch.upgrade().is_none());
    }
}
