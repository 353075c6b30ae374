use log::debug;
use serde_json::Value;

use crate::changes::{ChangeEvent, ChangeType, EventBatch, ListenOptions, OrderedSequence};
use crate::firestore::document::snap_to_data;
use crate::firestore::snapshot::{DocumentChange, DocumentSnapshot, QuerySnapshot};
use crate::observable::{self, Observable};

/// Listen options of the document-store views: `added`, `modified` and
/// `removed`. Queries never report `moved`.
pub fn default_listen_options() -> ListenOptions {
    ListenOptions::default().with_events([
        ChangeType::Added,
        ChangeType::Modified,
        ChangeType::Removed,
    ])
}

/// Document changes of `current`, completed with a `modified` change for
/// every document whose metadata changed since `prior`.
///
/// Query snapshots do not report metadata-only changes in their document
/// changes. When the snapshot metadata differs from the prior snapshot, each
/// document is compared with its entry in the reported changes, or failing
/// that with its prior version, and a `modified` change at its current index
/// is appended when the metadata differs or no prior version exists.
pub fn with_metadata_changes(
    prior: Option<&QuerySnapshot>,
    current: &QuerySnapshot,
) -> EventBatch<DocumentSnapshot> {
    let reported = current.doc_changes();
    let mut changes = reported.to_vec();
    let Some(prior) = prior else {
        return changes;
    };
    if prior.metadata() == current.metadata() {
        return changes;
    }

    for (index, document) in current.documents().iter().enumerate() {
        let unchanged = match reported.iter().find(|change| change.item.path() == document.path()) {
            Some(change) => change.item.metadata() == document.metadata(),
            None => prior
                .documents()
                .iter()
                .find(|previous| previous.path() == document.path())
                .is_some_and(|previous| previous.metadata() == document.metadata()),
        };
        if !unchanged {
            debug!("metadata of '{}' changed, reporting it as modified", document.path());
            changes.push(ChangeEvent::modified(document.clone(), index, index));
        }
    }
    changes
}

/// Stream of document changes, in order of occurrence rather than query order.
pub fn collection_changes(
    snapshots: Observable<QuerySnapshot>,
    options: &ListenOptions,
) -> Observable<EventBatch<DocumentSnapshot>> {
    let batches = snapshots.operate(
        || None::<QuerySnapshot>,
        |prior, snapshot| {
            let changes = with_metadata_changes(prior.as_ref(), snapshot);
            *prior = Some(snapshot.clone());
            Ok(Some(changes))
        },
    );
    observable::collection_changes(batches, options)
}

/// Documents of the query in query order, rebuilt from the document changes.
pub fn sorted_changes(
    snapshots: Observable<QuerySnapshot>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<DocumentSnapshot>> {
    observable::sorted_changes(collection_changes(snapshots, options), &ListenOptions::default())
}

/// Every document change seen so far, collected over time.
pub fn audit_trail(
    snapshots: Observable<QuerySnapshot>,
    options: &ListenOptions,
) -> Observable<OrderedSequence<DocumentChange>> {
    observable::audit_trail(collection_changes(snapshots, options), &ListenOptions::default())
}

/// Documents of every snapshot, as delivered by the query.
pub fn collection(snapshots: Observable<QuerySnapshot>) -> Observable<OrderedSequence<DocumentSnapshot>> {
    observable::ordered_snapshot(snapshots.map(|snapshot| snapshot.documents().to_vec()))
}

/// Data of the query documents, with the document id under `id_field` when set.
pub fn collection_data(
    snapshots: Observable<QuerySnapshot>,
    id_field: Option<String>,
) -> Observable<Vec<Value>> {
    snapshots.map(move |snapshot| {
        snapshot
            .documents()
            .iter()
            .filter_map(|document| snap_to_data(document, id_field.as_deref()))
            .collect()
    })
}
