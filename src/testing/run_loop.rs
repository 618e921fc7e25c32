//! A [`RunLoop`] that only runs idle callbacks when told to.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::toolkit::{IdleCallback, IdleToken, RunLoop};

/// FIFO queue of idle callbacks, drained by [`run_idle`](ManualRunLoop::run_idle).
#[derive(Default)]
pub struct ManualRunLoop {
    queue: RefCell<VecDeque<(IdleToken, IdleCallback)>>,
    next_token: Cell<u64>,
}

impl ManualRunLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run queued callbacks until the queue is empty, including any scheduled by the
    /// callbacks themselves. Returns how many ran.
    pub fn run_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop before calling: callbacks may schedule more work.
            let next = self.queue.borrow_mut().pop_front();
            let Some((_, callback)) = next else {
                return ran;
            };
            callback();
            ran += 1;
        }
    }

    /// Number of callbacks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl RunLoop for ManualRunLoop {
    fn schedule_idle(&self, callback: IdleCallback) -> IdleToken {
        let token = IdleToken(self.next_token.get());
        self.next_token.set(token.0 + 1);
        self.queue.borrow_mut().push_back((token, callback));
        token
    }

    fn cancel_idle(&self, token: IdleToken) {
        self.queue.borrow_mut().retain(|(queued, _)| *queued != token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn runs_in_fifo_order() {
        let run_loop = ManualRunLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            run_loop.schedule_idle(Box::new(move || log.borrow_mut().push(tag)));
        }
        assert_eq!(run_loop.pending_count(), 2);
        assert_eq!(run_loop.run_idle(), 2);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn cancelled_callback_never_runs() {
        let run_loop = ManualRunLoop::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let token = run_loop.schedule_idle(Box::new(move || flag.set(true)));
        run_loop.cancel_idle(token);
        assert_eq!(run_loop.run_idle(), 0);
        assert!(!ran.get());
    }

    #[test]
    fn callbacks_may_schedule_more() {
        let run_loop = Rc::new(ManualRunLoop::new());
        let inner = Rc::clone(&run_loop);
        run_loop.schedule_idle(Box::new(move || {
            inner.schedule_idle(Box::new(|| {}));
        }));
        assert_eq!(run_loop.run_idle(), 2);
    }
}
