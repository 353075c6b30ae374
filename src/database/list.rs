use log::debug;
use serde_json::Value;

use crate::changes::{
    apply_change, ChangeEvent, ChangeType, EmissionGate, EventBatch, ListenOptions,
    OrderedSequence,
};
use crate::database::api::{ChildEvent, ChildEventType, DataSnapshot};
use crate::database::object::change_to_data;
use crate::observable::{self, Observable};

fn position_for(current: &[DataSnapshot], key: &str) -> Option<usize> {
    current.iter().position(|snapshot| snapshot.key() == key)
}

/// Index right after `previous_name`; the front when there is no previous
/// sibling, the end when the previous sibling is unknown.
fn position_after(current: &[DataSnapshot], previous_name: Option<&str>) -> usize {
    match previous_name {
        None => 0,
        Some(previous) => position_for(current, previous).map_or(current.len(), |at| at + 1),
    }
}

/// Same as [`position_after`], resolved against `current` with the element
/// at `removed` taken out.
fn position_after_removal(
    current: &[DataSnapshot],
    removed: usize,
    previous_name: Option<&str>,
) -> usize {
    let Some(previous) = previous_name else {
        return 0;
    };
    match position_for(current, previous) {
        Some(at) if at == removed => removed,
        Some(at) if at > removed => at,
        Some(at) => at + 1,
        None => current.len() - 1,
    }
}

/// Translates a key-positioned child event into an index-based change event
/// against `current`.
///
/// Returns `None` for `changed`, `removed` and `moved` events about children
/// that are not part of `current`.
pub fn index_child_event(
    current: &[DataSnapshot],
    event: &ChildEvent,
) -> Option<ChangeEvent<DataSnapshot>> {
    let key = event.snapshot.key();
    let previous_name = event.previous_name.as_deref();
    let position = position_for(current, key);
    let snapshot = event.snapshot.clone();

    match (event.event_type, position) {
        (ChildEventType::Added, None) => Some(ChangeEvent::added(
            snapshot,
            position_after(current, previous_name),
        )),
        (ChildEventType::Added, Some(at)) => {
            let previous = at.checked_sub(1).map(|before| current[before].key());
            if previous == previous_name {
                // Repeated child_added; the engine drops it.
                Some(ChangeEvent::added(snapshot, at))
            } else {
                let to = position_after_removal(current, at, previous_name);
                Some(ChangeEvent::modified(snapshot, at, to))
            }
        }
        (ChildEventType::Changed, Some(at)) => Some(ChangeEvent::modified(snapshot, at, at)),
        (ChildEventType::Removed, Some(at)) => Some(ChangeEvent::removed(snapshot, at)),
        (ChildEventType::Moved, Some(at)) => {
            let to = position_after_removal(current, at, previous_name);
            Some(ChangeEvent::moved(snapshot, at, to))
        }
        (event_type, None) => {
            debug!("dropping {event_type} event for unknown child '{key}'");
            None
        }
    }
}

/// Stream of index-based change batches for a list of children.
///
/// `child_events` must deliver the initial listing as its first batch (see
/// [`ChildEvent::initial_batch`]), then the child events of every update.
/// Event types outside `options.events` are dropped before they are indexed.
pub fn list_changes(
    child_events: Observable<Vec<ChildEvent>>,
    options: &ListenOptions,
) -> Observable<EventBatch<DataSnapshot>> {
    let events = options.events;
    child_events.operate(
        || (EmissionGate::new(), OrderedSequence::<DataSnapshot>::new()),
        move |(gate, current), child_events| {
            let mut batch = Vec::with_capacity(child_events.len());
            for event in child_events {
                if !events.contains(ChangeType::from(event.event_type)) {
                    continue;
                }
                if let Some(change) = index_child_event(current, event) {
                    *current = apply_change(current, &change)?;
                    batch.push(change);
                }
            }
            Ok(gate.admit(&batch).then_some(batch))
        },
    )
}

/// Ordered children of a location, kept up to date from its child events.
pub fn list(
    child_events: Observable<Vec<ChildEvent>>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<DataSnapshot>> {
    observable::sorted_changes(
        list_changes(child_events, options),
        &ListenOptions::default(),
    )
}

/// Ordered child values, with the child key copied into `key_field` when set.
pub fn list_val(
    child_events: Observable<Vec<ChildEvent>>,
    options: &ListenOptions,
    key_field: Option<String>,
) -> Observable<Vec<Value>> {
    list(child_events, options).map(move |snapshots| {
        snapshots
            .iter()
            .map(|snapshot| change_to_data(snapshot, key_field.as_deref()))
            .collect()
    })
}

/// Every child change of a location, accumulated in arrival order.
pub fn audit_trail(
    child_events: Observable<Vec<ChildEvent>>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<ChangeEvent<DataSnapshot>>> {
    observable::audit_trail(
        list_changes(child_events, options),
        &ListenOptions::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snap(key: &str) -> DataSnapshot {
        DataSnapshot::new(key, json!({ "name": key }))
    }

    fn keys(current: &[DataSnapshot]) -> Vec<&str> {
        current.iter().map(DataSnapshot::key).collect()
    }

    fn event(event_type: ChildEventType, key: &str, previous: Option<&str>) -> ChildEvent {
        ChildEvent::new(event_type, snap(key), previous.map(str::to_owned))
    }

    fn fold(current: &[DataSnapshot], events: &[ChildEvent]) -> Vec<DataSnapshot> {
        let mut sequence = OrderedSequence::from(current.to_vec());
        for child_event in events {
            if let Some(change) = index_child_event(&sequence, child_event) {
                sequence = apply_change(&sequence, &change).unwrap();
            }
        }
        sequence.to_vec()
    }

    #[test]
    fn added_is_placed_after_previous_sibling() {
        let current = vec![snap("a"), snap("c")];
        let change = index_child_event(&current, &event(ChildEventType::Added, "b", Some("a")));
        assert_eq!(change, Some(ChangeEvent::added(snap("b"), 1)));

        let first = index_child_event(&current, &event(ChildEventType::Added, "z", None));
        assert_eq!(first.unwrap().new_index, Some(0));

        let unknown_previous =
            index_child_event(&current, &event(ChildEventType::Added, "q", Some("missing")));
        assert_eq!(unknown_previous.unwrap().new_index, Some(2));
    }

    #[test]
    fn repeated_added_is_a_duplicate() {
        let current = vec![snap("a"), snap("b")];
        let result = fold(&current, &[event(ChildEventType::Added, "b", Some("a"))]);
        assert_eq!(keys(&result), vec!["a", "b"]);
    }

    #[test]
    fn added_with_other_previous_reorders() {
        let current = vec![snap("a"), snap("b"), snap("c")];
        let result = fold(&current, &[event(ChildEventType::Added, "a", Some("c"))]);
        assert_eq!(keys(&result), vec!["b", "c", "a"]);
    }

    #[test]
    fn moved_follows_previous_sibling() {
        let current = vec![snap("a"), snap("b"), snap("c")];
        assert_eq!(
            keys(&fold(&current, &[event(ChildEventType::Moved, "c", None)])),
            vec!["c", "a", "b"]
        );
        assert_eq!(
            keys(&fold(&current, &[event(ChildEventType::Moved, "a", Some("b"))])),
            vec!["b", "a", "c"]
        );
        assert_eq!(
            keys(&fold(&current, &[event(ChildEventType::Moved, "b", Some("c"))])),
            vec!["a", "c", "b"]
        );
    }

    #[test]
    fn changed_replaces_in_place_and_removed_drops() {
        let current = vec![snap("a"), snap("b")];
        let changed = ChildEvent::new(
            ChildEventType::Changed,
            DataSnapshot::new("b", json!({ "name": "B" })),
            Some("a".to_string()),
        );
        let result = fold(&current, &[changed, event(ChildEventType::Removed, "a", None)]);
        assert_eq!(result, vec![DataSnapshot::new("b", json!({ "name": "B" }))]);
    }

    #[test]
    fn events_about_unknown_children_are_dropped() {
        let current = vec![snap("a")];
        assert_eq!(
            index_child_event(&current, &event(ChildEventType::Removed, "x", None)),
            None
        );
        assert_eq!(
            index_child_event(&current, &event(ChildEventType::Changed, "x", None)),
            None
        );
    }
}
