use std::fmt;
use std::sync::{Arc, Mutex};

pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// Cancellation handle returned when a subscription starts.
///
/// Dropping the handle tears the subscription down, exactly like calling
/// [`Subscription::unsubscribe`].
pub struct Subscription {
    teardown: Option<Unsubscribe>,
}

impl Subscription {
    pub fn new<F>(teardown: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A handle with nothing left to tear down.
    pub fn empty() -> Self {
        Self { teardown: None }
    }

    pub fn is_closed(&self) -> bool {
        self.teardown.is_none()
    }

    pub fn unsubscribe(mut self) {
        self.run_teardown();
    }

    fn run_teardown(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_teardown();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Holds the upstream subscription of an operator so that it can be released
/// from inside the operator's own callbacks.
#[derive(Clone, Default)]
pub(crate) struct UpstreamSlot {
    inner: Arc<Mutex<Option<Subscription>>>,
}

impl UpstreamSlot {
    /// Stores `upstream`, or drops it right away when the downstream side is
    /// already closed (e.g. the source failed while it was being attached).
    pub(crate) fn fill(&self, upstream: Subscription, downstream_closed: bool) {
        if downstream_closed {
            drop(upstream);
            return;
        }
        *self.inner.lock().unwrap() = Some(upstream);
    }

    pub(crate) fn release(&self) {
        let upstream = self.inner.lock().unwrap().take();
        drop(upstream);
    }
}
