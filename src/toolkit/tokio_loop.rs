//! Idle scheduling on a tokio `LocalSet`.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::{IdleCallback, IdleToken, RunLoop};

/// A [`RunLoop`] backed by `tokio::task::spawn_local`.
///
/// Each callback runs in its own local task after yielding once, so it never runs inside
/// the call that scheduled it.
///
/// A callback that panics does not die with its task: the panic is held until
/// [`run_until`](TokioRunLoop::run_until) or [`check`](TokioRunLoop::check) re-raises it
/// on the driving task. Drive the application through `run_until` so a fatal rebuild
/// stops it.
///
/// # Panics
///
/// [`schedule_idle`](RunLoop::schedule_idle) panics when called outside a
/// `tokio::task::LocalSet`.
#[derive(Debug, Default)]
pub struct TokioRunLoop {
    tasks: RefCell<HashMap<IdleToken, JoinHandle<()>>>,
    next_token: Cell<u64>,
    failure: Rc<Failure>,
}

/// The first panic raised by a callback, waiting to be re-raised.
#[derive(Default)]
struct Failure {
    payload: RefCell<Option<Box<dyn Any + Send>>>,
    raised: Notify,
}

impl Failure {
    fn record(&self, payload: Box<dyn Any + Send>) {
        let mut slot = self.payload.borrow_mut();
        if slot.is_none() {
            *slot = Some(payload);
            self.raised.notify_one();
        }
    }

    fn take(&self) -> Option<Box<dyn Any + Send>> {
        self.payload.borrow_mut().take()
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("failed", &self.payload.borrow().is_some())
            .finish()
    }
}

impl TokioRunLoop {
    /// Create an empty run loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scheduled callbacks that have not finished.
    pub fn pending_count(&self) -> usize {
        self.tasks
            .borrow()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Whether a callback has panicked and the panic has not been re-raised yet.
    pub fn has_failed(&self) -> bool {
        self.failure.payload.borrow().is_some()
    }

    /// Re-raise the panic of a failed callback, if any.
    pub fn check(&self) {
        if let Some(payload) = self.failure.take() {
            panic::resume_unwind(payload);
        }
    }

    /// Drive `future` to completion, re-raising the first callback panic as soon as it
    /// happens.
    ///
    /// Must be awaited inside the `LocalSet` the callbacks are spawned on.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        tokio::pin!(future);
        loop {
            tokio::select! {
                biased;
                () = self.failure.raised.notified() => self.check(),
                output = &mut future => {
                    self.check();
                    return output;
                }
            }
        }
    }
}

impl RunLoop for TokioRunLoop {
    fn schedule_idle(&self, callback: IdleCallback) -> IdleToken {
        let token = IdleToken(self.next_token.get());
        self.next_token.set(token.0 + 1);

        let failure = Rc::clone(&self.failure);
        let task = tokio::task::spawn_local(async move {
            tokio::task::yield_now().await;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
                tracing::error!("idle callback panicked");
                failure.record(payload);
            }
        });

        let mut tasks = self.tasks.borrow_mut();
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(token, task);
        token
    }

    fn cancel_idle(&self, token: IdleToken) {
        if let Some(task) = self.tasks.borrow_mut().remove(&token) {
            task.abort();
        }
    }
}
