use serde_json::Value;

use crate::database::api::DataSnapshot;
use crate::observable::Observable;

/// Returns the snapshot value, with the snapshot key copied into `key_field`
/// when the value is an object and a field name is given.
///
/// Missing data and primitive values are returned unchanged.
pub fn change_to_data(snapshot: &DataSnapshot, key_field: Option<&str>) -> Value {
    match (snapshot.value(), key_field) {
        (Value::Object(map), Some(field)) => {
            let mut map = map.clone();
            map.insert(field.to_owned(), Value::String(snapshot.key().to_owned()));
            Value::Object(map)
        }
        (value, _) => value.clone(),
    }
}

/// Maps a stream of snapshots of a single location to their values.
pub fn object_val(snapshots: Observable<DataSnapshot>, key_field: Option<String>) -> Observable<Value> {
    snapshots.map(move |snapshot| change_to_data(snapshot, key_field.as_deref()))
}
