use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::changes::ChangesError;

pub type NextFn<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;
pub type ErrorFn = Arc<dyn Fn(&ChangesError) + Send + Sync + 'static>;
pub type CompleteFn = Arc<dyn Fn() + Send + Sync + 'static>;

pub struct PartialObserver<T> {
    pub next: Option<NextFn<T>>,
    pub error: Option<ErrorFn>,
    pub complete: Option<CompleteFn>,
}

impl<T> PartialObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.next = Some(Arc::new(callback));
        self
    }

    pub fn with_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChangesError) + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(callback));
        self
    }

    pub fn with_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(callback));
        self
    }
}

impl<T> Clone for PartialObserver<T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next.clone(),
            error: self.error.clone(),
            complete: self.complete.clone(),
        }
    }
}

impl<T> Default for PartialObserver<T> {
    fn default() -> Self {
        Self {
            next: None,
            error: None,
            complete: None,
        }
    }
}

/// Observer bound to one subscription.
///
/// Once the subscription errors, completes or is unsubscribed, the subscriber
/// is closed and drops every further notification.
pub struct Subscriber<T> {
    observer: PartialObserver<T>,
    closed: Arc<AtomicBool>,
}

impl<T> Subscriber<T> {
    pub fn new(observer: PartialObserver<T>) -> Self {
        Self {
            observer,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn next(&self, value: &T) {
        if self.is_closed() {
            return;
        }
        if let Some(next) = &self.observer.next {
            next(value);
        }
    }

    pub fn error(&self, error: &ChangesError) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(callback) = &self.observer.error {
            callback(error);
        }
    }

    pub fn complete(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(callback) = &self.observer.complete {
            callback();
        }
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
            closed: Arc::clone(&self.closed),
        }
    }
}
