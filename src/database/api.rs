use std::fmt;

use serde_json::Value;

use crate::changes::{ChangeType, Identity};

/// Data read from a child of a realtime database location.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSnapshot {
    key: String,
    value: Value,
}

impl DataSnapshot {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn exists(&self) -> bool {
        !self.value.is_null()
    }
}

impl Identity for DataSnapshot {
    fn same_identity(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildEventType {
    Added,
    Changed,
    Removed,
    Moved,
}

impl ChildEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildEventType::Added => "child_added",
            ChildEventType::Changed => "child_changed",
            ChildEventType::Removed => "child_removed",
            ChildEventType::Moved => "child_moved",
        }
    }
}

impl fmt::Display for ChildEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ChildEventType> for ChangeType {
    fn from(event_type: ChildEventType) -> Self {
        match event_type {
            ChildEventType::Added => ChangeType::Added,
            ChildEventType::Changed => ChangeType::Modified,
            ChildEventType::Removed => ChangeType::Removed,
            ChildEventType::Moved => ChangeType::Moved,
        }
    }
}

/// Child event as delivered by `on_child_*` listeners.
///
/// `previous_name` is the key of the sibling ordered immediately before the
/// child, or `None` when the child comes first.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildEvent {
    pub event_type: ChildEventType,
    pub snapshot: DataSnapshot,
    pub previous_name: Option<String>,
}

impl ChildEvent {
    pub fn new(
        event_type: ChildEventType,
        snapshot: DataSnapshot,
        previous_name: Option<String>,
    ) -> Self {
        Self {
            event_type,
            snapshot,
            previous_name,
        }
    }

    /// Builds the `child_added` events describing an initial listing, given
    /// the children in query order.
    pub fn initial_batch<I>(children: I) -> Vec<ChildEvent>
    where
        I: IntoIterator<Item = DataSnapshot>,
    {
        let mut previous_name: Option<String> = None;
        children
            .into_iter()
            .map(|snapshot| {
                let key = snapshot.key().to_owned();
                ChildEvent::new(ChildEventType::Added, snapshot, previous_name.replace(key))
            })
            .collect()
    }
}
