use crate::changes::{
    filter_events, AuditTrail, ChangeEvent, EmissionGate, EventBatch, Identity, ListenOptions,
    OrderedSequence, SortedView,
};
use crate::observable::api::Observable;

/// Filters every batch down to the requested event types and suppresses empty
/// batches, except the very first one.
///
/// The result is in order of occurrence, not in sort order.
pub fn collection_changes<T>(
    batches: Observable<EventBatch<T>>,
    options: &ListenOptions,
) -> Observable<EventBatch<T>>
where
    T: Clone + Send + 'static,
{
    let events = options.events;
    batches.operate(EmissionGate::new, move |gate, batch| {
        let filtered = filter_events(batch, &events);
        Ok(gate.admit(&filtered).then_some(filtered))
    })
}

/// Maintains the sorted state of the collection from its change batches.
///
/// Emits the whole sequence after every batch that changed it. A batch that
/// cannot be applied terminates the subscription with a contract violation.
pub fn sorted_changes<T>(
    batches: Observable<EventBatch<T>>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<T>>
where
    T: Clone + PartialEq + Identity + Send + Sync + 'static,
{
    collection_changes(batches, options).operate(SortedView::<T>::new, |view, batch| view.apply(batch))
}

/// Same as [`sorted_changes`] with an explicit identity predicate.
pub fn sorted_changes_by<T, F>(
    batches: Observable<EventBatch<T>>,
    options: &ListenOptions,
    same_item: F,
) -> Observable<OrderedSequence<T>>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    F: Fn(&T, &T) -> bool + Clone + Send + Sync + 'static,
{
    collection_changes(batches, options).operate(
        move || SortedView::with_identity(same_item.clone()),
        |view, batch| view.apply(batch),
    )
}

/// Collects every accepted change event over time, in arrival order.
pub fn audit_trail<T>(
    batches: Observable<EventBatch<T>>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<ChangeEvent<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    collection_changes(batches, options).operate(AuditTrail::<T>::new, |trail, batch| {
        Ok(Some(trail.record(batch).clone()))
    })
}

/// Forwards lists that are already in their final order without reconciling them.
pub fn ordered_snapshot<T>(snapshots: Observable<Vec<T>>) -> Observable<OrderedSequence<T>>
where
    T: Clone + 'static,
{
    snapshots.map(|items| OrderedSequence::from(items.clone()))
}
