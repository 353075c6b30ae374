use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use log::warn;

use crate::changes::{ChangesError, ChangesResult};
use crate::observable::observer::{PartialObserver, Subscriber};
use crate::observable::source::{Source, SourceCallback};
use crate::observable::stream::ObservableStream;
use crate::observable::subscription::{Subscription, UpstreamSlot};

type SubscribeFn<T> = dyn Fn(Subscriber<T>) -> Subscription + Send + Sync + 'static;

/// Lazy, push-based sequence of values.
///
/// Nothing happens until [`Observable::subscribe`] is called. Every
/// subscription runs its own copy of the pipeline, so per-subscriber state
/// such as the reconciled sequence is never shared between subscribers.
pub struct Observable<T> {
    subscribe: Arc<SubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Arc::clone(&self.subscribe),
        }
    }
}

impl<T: 'static> Observable<T> {
    pub fn new<F>(subscribe: F) -> Self
    where
        F: Fn(Subscriber<T>) -> Subscription + Send + Sync + 'static,
    {
        Self {
            subscribe: Arc::new(subscribe),
        }
    }

    /// Wraps a listener-based source. Subscribing registers a listener,
    /// unsubscribing detaches it, and a failure reported by the source is
    /// forwarded verbatim and detaches it as well.
    pub fn from_source<S>(source: S) -> Self
    where
        S: Source<T> + 'static,
    {
        let source = Arc::new(source);
        Observable::new(move |subscriber: Subscriber<T>| {
            let slot = UpstreamSlot::default();
            let callback: SourceCallback<T> = {
                let subscriber = subscriber.clone();
                let slot = slot.clone();
                Arc::new(move |result: ChangesResult<T>| match result {
                    Ok(value) => subscriber.next(&value),
                    Err(err) => {
                        warn!("source listener failed: {err}");
                        subscriber.error(&err);
                        slot.release();
                    }
                })
            };
            match source.listen(callback) {
                Ok(registration) => {
                    slot.fill(registration, subscriber.is_closed());
                    Subscription::new(move || slot.release())
                }
                Err(err) => {
                    warn!("failed to register source listener: {err}");
                    subscriber.error(&err);
                    Subscription::empty()
                }
            }
        })
    }

    pub fn subscribe(&self, observer: PartialObserver<T>) -> Subscription {
        let subscriber = Subscriber::new(observer);
        let handle = subscriber.clone();
        let inner = (self.subscribe)(subscriber);
        Subscription::new(move || {
            handle.close();
            drop(inner);
        })
    }

    /// Shortcut for subscribing with only a `next` callback.
    pub fn subscribe_next<F>(&self, next: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe(PartialObserver::new().with_next(next))
    }

    /// Runs a stateful step for every value. A fresh state is created with
    /// `init` for each subscription. `Ok(None)` swallows the value, an error
    /// terminates the subscription and detaches the upstream.
    pub(crate) fn operate<U, S, I, F>(self, init: I, step: F) -> Observable<U>
    where
        U: 'static,
        S: Send + 'static,
        I: Fn() -> S + Send + Sync + 'static,
        F: Fn(&mut S, &T) -> ChangesResult<Option<U>> + Send + Sync + 'static,
    {
        let input = self;
        let step = Arc::new(step);
        Observable::new(move |downstream: Subscriber<U>| {
            let state = Arc::new(Mutex::new(init()));
            let slot = UpstreamSlot::default();

            let on_next = {
                let downstream = downstream.clone();
                let slot = slot.clone();
                let step = Arc::clone(&step);
                move |value: &T| {
                    if downstream.is_closed() {
                        return;
                    }
                    let outcome = {
                        let mut state = state.lock().unwrap();
                        step(&mut *state, value)
                    };
                    match outcome {
                        Ok(Some(output)) => downstream.next(&output),
                        Ok(None) => {}
                        Err(err) => {
                            warn!("terminating subscription: {err}");
                            downstream.error(&err);
                            slot.release();
                        }
                    }
                }
            };
            let on_error = {
                let downstream = downstream.clone();
                let slot = slot.clone();
                move |err: &ChangesError| {
                    downstream.error(err);
                    slot.release();
                }
            };
            let on_complete = {
                let downstream = downstream.clone();
                move || downstream.complete()
            };

            let upstream = input.subscribe(
                PartialObserver::new()
                    .with_next(on_next)
                    .with_error(on_error)
                    .with_complete(on_complete),
            );
            slot.fill(upstream, downstream.is_closed());
            Subscription::new(move || slot.release())
        })
    }

    pub fn map<U, F>(self, f: F) -> Observable<U>
    where
        U: 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.operate(|| (), move |_, value| Ok(Some(f(value))))
    }

    /// Bridges the observable into a [`futures::Stream`]. Dropping the stream
    /// unsubscribes.
    pub fn into_stream(self) -> ObservableStream<T>
    where
        T: Clone + Send,
    {
        ObservableStream::new(self)
    }

    /// Shares one upstream subscription between every subscriber and replays
    /// the latest value to late subscribers. The upstream is torn down once
    /// the last subscriber leaves.
    pub fn share_replay(self) -> Observable<T>
    where
        T: Clone + Send + Sync,
    {
        let upstream_source = self;
        let shared = Arc::new(Mutex::new(ShareState::<T>::default()));
        Observable::new(move |subscriber: Subscriber<T>| {
            let (id, replay, connect) = {
                let mut state = shared.lock().unwrap();
                let id = state.next_id;
                state.next_id += 1;
                state.subscribers.insert(id, subscriber.clone());
                let connect = state.upstream.is_none() && !state.connecting;
                if connect {
                    state.connecting = true;
                }
                (id, state.last.clone(), connect)
            };

            if let Some(value) = replay {
                subscriber.next(&value);
            }

            if connect {
                let upstream = upstream_source.subscribe(fan_out(Arc::clone(&shared)));
                let orphaned = {
                    let mut state = shared.lock().unwrap();
                    state.connecting = false;
                    if state.subscribers.is_empty() {
                        Some(upstream)
                    } else {
                        state.upstream = Some(upstream);
                        None
                    }
                };
                drop(orphaned);
            }

            let shared = Arc::clone(&shared);
            Subscription::new(move || {
                let upstream = {
                    let mut state = shared.lock().unwrap();
                    state.subscribers.remove(&id);
                    if state.subscribers.is_empty() {
                        state.last = None;
                        state.upstream.take()
                    } else {
                        None
                    }
                };
                drop(upstream);
            })
        })
    }
}

struct ShareState<T> {
    subscribers: BTreeMap<u64, Subscriber<T>>,
    next_id: u64,
    upstream: Option<Subscription>,
    connecting: bool,
    last: Option<T>,
}

impl<T> Default for ShareState<T> {
    fn default() -> Self {
        Self {
            subscribers: BTreeMap::new(),
            next_id: 0,
            upstream: None,
            connecting: false,
            last: None,
        }
    }
}

impl<T> ShareState<T> {
    /// Empties the state after a terminal notification, returning what the
    /// caller must notify and release outside the lock.
    fn terminate(&mut self) -> (Vec<Subscriber<T>>, Option<Subscription>) {
        self.last = None;
        let subscribers = std::mem::take(&mut self.subscribers).into_values().collect();
        (subscribers, self.upstream.take())
    }
}

fn fan_out<T>(shared: Arc<Mutex<ShareState<T>>>) -> PartialObserver<T>
where
    T: Clone + Send + Sync + 'static,
{
    let on_next = {
        let shared = Arc::clone(&shared);
        move |value: &T| {
            let subscribers: Vec<Subscriber<T>> = {
                let mut state = shared.lock().unwrap();
                state.last = Some(value.clone());
                state.subscribers.values().cloned().collect()
            };
            for subscriber in subscribers {
                subscriber.next(value);
            }
        }
    };
    let on_error = {
        let shared = Arc::clone(&shared);
        move |err: &ChangesError| {
            let (subscribers, upstream) = shared.lock().unwrap().terminate();
            for subscriber in subscribers {
                subscriber.error(err);
            }
            drop(upstream);
        }
    };
    let on_complete = move || {
        let (subscribers, upstream) = shared.lock().unwrap().terminate();
        for subscriber in subscribers {
            subscriber.complete();
        }
        drop(upstream);
    };
    PartialObserver::new()
        .with_next(on_next)
        .with_error(on_error)
        .with_complete(on_complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::error::{contract_violation, source_failure};
    use crate::observable::source::MemorySource;

    fn collect<T: Clone + Send + Sync + 'static>(
        observable: &Observable<T>,
    ) -> (Subscription, Arc<Mutex<Vec<T>>>, Arc<Mutex<Vec<ChangesError>>>) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let captured_values = Arc::clone(&values);
        let captured_errors = Arc::clone(&errors);
        let subscription = observable.subscribe(
            PartialObserver::new()
                .with_next(move |value: &T| captured_values.lock().unwrap().push(value.clone()))
                .with_error(move |err| captured_errors.lock().unwrap().push(err.clone())),
        );
        (subscription, values, errors)
    }

    #[test]
    fn unsubscribe_detaches_the_source_listener() {
        let source = MemorySource::<u32>::new();
        let observable = Observable::from_source(source.clone());
        let (subscription, values, _) = collect(&observable);
        assert_eq!(source.listener_count(), 1);

        source.emit(1);
        subscription.unsubscribe();
        source.emit(2);

        assert_eq!(source.listener_count(), 0);
        assert_eq!(values.lock().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn source_failure_is_forwarded_and_detaches() {
        let source = MemorySource::<u32>::new();
        let observable = Observable::from_source(source.clone()).map(|value| value * 10);
        let (_subscription, values, errors) = collect(&observable);

        source.emit(1);
        source.fail(source_failure("permission denied"));
        source.emit(2);

        assert_eq!(values.lock().unwrap().as_slice(), &[10]);
        assert_eq!(errors.lock().unwrap().as_slice(), &[source_failure("permission denied")]);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn failing_step_terminates_the_subscription() {
        let source = MemorySource::<u32>::new();
        let observable = Observable::from_source(source.clone()).operate(
            || 0u32,
            |seen, value| {
                *seen += 1;
                if *value > 5 {
                    return Err(contract_violation("value too large"));
                }
                Ok(Some(*seen))
            },
        );
        let (_subscription, values, errors) = collect(&observable);

        source.emit(1);
        source.emit(9);
        source.emit(2);

        assert_eq!(values.lock().unwrap().as_slice(), &[1]);
        assert_eq!(errors.lock().unwrap().len(), 1);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn each_subscription_gets_fresh_state() {
        let source = MemorySource::<u32>::new();
        let counts = Observable::from_source(source.clone()).operate(
            || 0u32,
            |count, _| {
                *count += 1;
                Ok(Some(*count))
            },
        );
        let (_first, first_values, _) = collect(&counts);
        source.emit(1);
        let (_second, second_values, _) = collect(&counts);
        source.emit(1);

        assert_eq!(first_values.lock().unwrap().as_slice(), &[1, 2]);
        assert_eq!(second_values.lock().unwrap().as_slice(), &[1]);
    }

    #[test]
    fn share_replay_replays_last_value_to_late_subscribers() {
        let source = MemorySource::<u32>::new();
        let shared = Observable::from_source(source.clone()).share_replay();

        let (first, first_values, _) = collect(&shared);
        source.emit(1);
        let (second, second_values, _) = collect(&shared);
        source.emit(2);

        assert_eq!(source.listener_count(), 1);
        assert_eq!(first_values.lock().unwrap().as_slice(), &[1, 2]);
        assert_eq!(second_values.lock().unwrap().as_slice(), &[1, 2]);

        first.unsubscribe();
        assert_eq!(source.listener_count(), 1);
        second.unsubscribe();
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn share_replay_reconnects_after_all_subscribers_leave() {
        let source = MemorySource::<u32>::new();
        let shared = Observable::from_source(source.clone()).share_replay();

        let (first, _, _) = collect(&shared);
        source.emit(1);
        drop(first);

        let (_second, second_values, _) = collect(&shared);
        assert_eq!(source.listener_count(), 1);
        assert!(second_values.lock().unwrap().is_empty());
    }

    #[test]
    fn share_replay_propagates_errors_to_every_subscriber() {
        let source = MemorySource::<u32>::new();
        let shared = Observable::from_source(source.clone()).share_replay();
        let (_first, _, first_errors) = collect(&shared);
        let (_second, _, second_errors) = collect(&shared);

        source.fail(source_failure("offline"));

        assert_eq!(first_errors.lock().unwrap().len(), 1);
        assert_eq!(second_errors.lock().unwrap().len(), 1);
        assert_eq!(source.listener_count(), 0);
    }
}
