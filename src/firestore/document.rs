use serde_json::Value;

use crate::firestore::snapshot::DocumentSnapshot;
use crate::observable::Observable;

/// Returns the document data, with the document id stored under `id_field`
/// when one is given. `None` when the document does not exist.
pub fn snap_to_data(snapshot: &DocumentSnapshot, id_field: Option<&str>) -> Option<Value> {
    let data = snapshot.data()?;
    let mut data = data.clone();
    if let Some(field) = id_field {
        data.insert(field.to_owned(), Value::String(snapshot.id().to_owned()));
    }
    Some(Value::Object(data))
}

/// Maps the snapshots of a document to its data.
pub fn doc_data(
    snapshots: Observable<DocumentSnapshot>,
    id_field: Option<String>,
) -> Observable<Option<Value>> {
    snapshots.map(move |snapshot| snap_to_data(snapshot, id_field.as_deref()))
}
