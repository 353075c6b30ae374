use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::changes::{ChangesError, ChangesResult};
use crate::observable::subscription::Subscription;

pub type SourceCallback<E> = Arc<dyn Fn(ChangesResult<E>) + Send + Sync + 'static>;

/// Push-based producer of values, typically a listener registered on an SDK
/// reference or query.
///
/// `listen` registers `callback` and returns the handle that detaches it. A
/// source must not hold internal locks while invoking callbacks, since a
/// callback may detach its own listener.
pub trait Source<E>: Send + Sync {
    fn listen(&self, callback: SourceCallback<E>) -> ChangesResult<Subscription>;
}

impl<E, S> Source<E> for Arc<S>
where
    S: Source<E> + ?Sized,
{
    fn listen(&self, callback: SourceCallback<E>) -> ChangesResult<Subscription> {
        (**self).listen(callback)
    }
}

/// Adapts a closure to the [`Source`] trait.
pub struct FnSource<F> {
    listen: F,
}

impl<F> FnSource<F> {
    pub fn new(listen: F) -> Self {
        Self { listen }
    }
}

impl<E, F> Source<E> for FnSource<F>
where
    F: Fn(SourceCallback<E>) -> ChangesResult<Subscription> + Send + Sync,
{
    fn listen(&self, callback: SourceCallback<E>) -> ChangesResult<Subscription> {
        (self.listen)(callback)
    }
}

/// In-memory source that broadcasts pushed values to every registered listener.
///
/// Useful for tests and for bridging SDK callbacks that are not modelled as a
/// [`Source`] yet.
pub struct MemorySource<E> {
    inner: Arc<MemorySourceInner<E>>,
}

struct MemorySourceInner<E> {
    listeners: Mutex<BTreeMap<u64, SourceCallback<E>>>,
    current: Mutex<Option<E>>,
    next_listener_id: AtomicU64,
}

impl<E> MemorySource<E>
where
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemorySourceInner {
                listeners: Mutex::new(BTreeMap::new()),
                current: Mutex::new(None),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Sets the value handed to listeners as soon as they register.
    pub fn set_current(&self, value: E) {
        *self.inner.current.lock().unwrap() = Some(value);
    }

    /// Delivers `value` to every registered listener.
    pub fn emit(&self, value: E) {
        for callback in self.callbacks() {
            callback(Ok(value.clone()));
        }
    }

    /// Delivers `error` to every registered listener.
    pub fn fail(&self, error: ChangesError) {
        for callback in self.callbacks() {
            callback(Err(error.clone()));
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap().len()
    }

    fn callbacks(&self) -> Vec<SourceCallback<E>> {
        self.inner.listeners.lock().unwrap().values().cloned().collect()
    }
}

impl<E> Clone for MemorySource<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for MemorySource<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Source<E> for MemorySource<E>
where
    E: Clone + Send + 'static,
{
    fn listen(&self, callback: SourceCallback<E>) -> ChangesResult<Subscription> {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.inner
            .listeners
            .lock()
            .unwrap()
            .insert(id, Arc::clone(&callback));

        let current = self.inner.current.lock().unwrap().clone();
        if let Some(value) = current {
            callback(Ok(value));
        }

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.listeners.lock().unwrap().remove(&id);
            }
        }))
    }
}
