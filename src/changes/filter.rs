use crate::changes::types::{ChangeEvent, ChangeTypeSet, EventBatch};

/// Returns the events of `batch` whose type is in `events`, in their original order.
///
/// An empty result is returned as-is; deciding whether to emit it is up to the
/// caller (see [`EmissionGate`](crate::changes::EmissionGate)).
pub fn filter_events<T: Clone>(batch: &[ChangeEvent<T>], events: &ChangeTypeSet) -> EventBatch<T> {
    batch
        .iter()
        .filter(|change| events.contains(change.change_type))
        .cloned()
        .collect()
}
