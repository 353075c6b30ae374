use firebase_rs_rx::changes::error::source_failure;
use firebase_rs_rx::changes::{
    ChangeEvent, ChangeType, ChangesError, EventBatch, ListenOptions, OrderedSequence,
};
use firebase_rs_rx::observable::{
    audit_trail, collection_changes, sorted_changes, MemorySource, Observable, PartialObserver,
    Subscription,
};
use futures::executor::block_on;
use futures::StreamExt;
use std::sync::{Arc, Mutex};

type Log<T> = Arc<Mutex<Vec<T>>>;

fn observe<T: Clone + Send + Sync + 'static>(
    observable: &Observable<T>,
) -> (Subscription, Log<T>, Log<ChangesError>) {
    let values: Log<T> = Arc::new(Mutex::new(Vec::new()));
    let errors: Log<ChangesError> = Arc::new(Mutex::new(Vec::new()));
    let captured_values = values.clone();
    let captured_errors = errors.clone();
    let subscription = observable.subscribe(
        PartialObserver::new()
            .with_next(move |value: &T| captured_values.lock().unwrap().push(value.clone()))
            .with_error(move |err: &ChangesError| captured_errors.lock().unwrap().push(err.clone())),
    );
    (subscription, values, errors)
}

fn added(id: u32, index: usize) -> ChangeEvent<u32> {
    ChangeEvent::added(id, index)
}

#[test]
fn first_batch_is_emitted_even_when_empty() {
    let source: MemorySource<EventBatch<u32>> = MemorySource::new();
    let options = ListenOptions::default().with_events([ChangeType::Removed]);
    let (_subscription, values, _) =
        observe(&collection_changes(Observable::from_source(source.clone()), &options));

    source.emit(vec![added(1, 0)]);
    source.emit(vec![added(2, 1)]);
    source.emit(vec![ChangeEvent::removed(1, 0)]);

    let values = values.lock().unwrap();
    assert_eq!(values.as_slice(), &[Vec::new(), vec![ChangeEvent::removed(1, 0)]]);
}

#[test]
fn unchanged_sequences_are_not_emitted_twice() {
    let source = MemorySource::new();
    let (_subscription, values, _) = observe(&sorted_changes(
        Observable::from_source(source.clone()),
        &ListenOptions::default(),
    ));

    source.emit(vec![added(1, 0), added(2, 1)]);
    source.emit(vec![added(2, 1)]);
    source.emit(vec![ChangeEvent::moved(2, 1, 0)]);

    let values = values.lock().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0], vec![1, 2]);
    assert_eq!(values[1], vec![2, 1]);
}

#[test]
fn audit_trail_length_is_the_sum_of_filtered_batches() {
    let source = MemorySource::new();
    let options = ListenOptions::default().with_events([ChangeType::Added, ChangeType::Removed]);
    let (_subscription, values, _) =
        observe(&audit_trail(Observable::from_source(source.clone()), &options));

    let batches = vec![
        vec![added(1, 0), added(2, 1)],
        vec![ChangeEvent::modified(2, 1, 1)],
        vec![ChangeEvent::removed(1, 0), added(3, 1)],
    ];
    for batch in &batches {
        source.emit(batch.clone());
    }

    let values = values.lock().unwrap();
    let lengths: Vec<usize> = values.iter().map(|trail| trail.len()).collect();
    assert_eq!(lengths, vec![2, 4]);
    assert_eq!(values[1][..2], values[0][..]);
}

#[test]
fn unsubscribing_detaches_the_source_listener() {
    let source: MemorySource<EventBatch<u32>> = MemorySource::new();
    let (subscription, values, _) = observe(&sorted_changes(
        Observable::from_source(source.clone()),
        &ListenOptions::default(),
    ));
    assert_eq!(source.listener_count(), 1);

    subscription.unsubscribe();
    source.emit(vec![added(1, 0)]);

    assert_eq!(source.listener_count(), 0);
    assert!(values.lock().unwrap().is_empty());
}

#[test]
fn contract_violation_terminates_and_detaches() {
    let source = MemorySource::new();
    let (_subscription, values, errors) = observe(&sorted_changes(
        Observable::from_source(source.clone()),
        &ListenOptions::default(),
    ));

    source.emit(vec![added(1, 0)]);
    source.emit(vec![added(2, 5)]);
    source.emit(vec![added(3, 1)]);

    assert_eq!(values.lock().unwrap().len(), 1);
    let errors = errors.lock().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_contract_violation());
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn source_failures_are_forwarded() {
    let source: MemorySource<EventBatch<u32>> = MemorySource::new();
    let (_subscription, _, errors) = observe(&collection_changes(
        Observable::from_source(source.clone()),
        &ListenOptions::default(),
    ));

    source.fail(source_failure("permission denied"));

    assert_eq!(errors.lock().unwrap().as_slice(), &[source_failure("permission denied")]);
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn every_subscriber_folds_from_empty() {
    let source = MemorySource::new();
    let sorted = sorted_changes(Observable::from_source(source.clone()), &ListenOptions::default());

    let (_first, first_values, _) = observe(&sorted);
    source.emit(vec![added(1, 0)]);
    let (_second, second_values, _) = observe(&sorted);
    source.emit(vec![added(2, 0)]);

    assert_eq!(first_values.lock().unwrap().last().unwrap(), &vec![2, 1]);
    assert_eq!(second_values.lock().unwrap().as_slice(), &[OrderedSequence::from(vec![2])]);
}

#[test]
fn shared_sorted_view_replays_to_late_subscribers() {
    let source = MemorySource::new();
    let shared =
        sorted_changes(Observable::from_source(source.clone()), &ListenOptions::default())
            .share_replay();

    let (first, _, _) = observe(&shared);
    source.emit(vec![added(7, 0), added(3, 1)]);
    let (second, late_values, _) = observe(&shared);

    assert_eq!(source.listener_count(), 1);
    assert_eq!(late_values.lock().unwrap().as_slice(), &[OrderedSequence::from(vec![7, 3])]);

    first.unsubscribe();
    assert_eq!(source.listener_count(), 1);
    second.unsubscribe();
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn stream_bridge_yields_sorted_sequences() {
    let source = MemorySource::new();
    let mut stream =
        sorted_changes(Observable::from_source(source.clone()), &ListenOptions::default())
            .into_stream();

    source.emit(vec![added(1, 0)]);
    source.emit(vec![ChangeEvent::added(2, 0)]);
    source.fail(source_failure("offline"));

    block_on(async {
        assert_eq!(stream.next().await, Some(Ok(OrderedSequence::from(vec![1]))));
        assert_eq!(stream.next().await, Some(Ok(OrderedSequence::from(vec![2, 1]))));
        assert_eq!(stream.next().await, Some(Err(source_failure("offline"))));
        assert_eq!(stream.next().await, None);
    });
    assert_eq!(source.listener_count(), 0);
}
