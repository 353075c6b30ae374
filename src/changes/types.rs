use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of mutation carried by a [`ChangeEvent`].
///
/// `Unknown` is what an unrecognised or missing wire value decodes to. It never
/// matches an event filter and the reconciliation fold treats it as a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
    Moved,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChangeType {
    pub const ALL: [ChangeType; 4] = [
        ChangeType::Added,
        ChangeType::Modified,
        ChangeType::Removed,
        ChangeType::Moved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Removed => "removed",
            ChangeType::Moved => "moved",
            ChangeType::Unknown => "unknown",
        }
    }

    fn bit(self) -> u8 {
        match self {
            ChangeType::Added => 0b0001,
            ChangeType::Modified => 0b0010,
            ChangeType::Removed => 0b0100,
            ChangeType::Moved => 0b1000,
            ChangeType::Unknown => 0,
        }
    }
}

impl From<&str> for ChangeType {
    fn from(value: &str) -> Self {
        match value {
            "added" => ChangeType::Added,
            "modified" => ChangeType::Modified,
            "removed" => ChangeType::Removed,
            "moved" => ChangeType::Moved,
            _ => ChangeType::Unknown,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of change types a subscriber is interested in.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeTypeSet {
    bits: u8,
}

impl ChangeTypeSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn all() -> Self {
        Self { bits: 0b1111 }
    }

    pub fn with(mut self, change_type: ChangeType) -> Self {
        self.bits |= change_type.bit();
        self
    }

    pub fn contains(&self, change_type: ChangeType) -> bool {
        let bit = change_type.bit();
        bit != 0 && self.bits & bit == bit
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ChangeType> + '_ {
        ChangeType::ALL
            .into_iter()
            .filter(move |change_type| self.contains(*change_type))
    }
}

impl Default for ChangeTypeSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<ChangeType> for ChangeTypeSet {
    fn from_iter<I: IntoIterator<Item = ChangeType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ChangeTypeSet::empty(), |set, change_type| set.with(change_type))
    }
}

impl fmt::Debug for ChangeTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A single mutation detected between two observations of a collection.
///
/// Indices follow the convention of the source: `old_index` points into the
/// sequence before the event, `new_index` into the sequence after it. On the
/// wire a negative index (the `-1` used by listener SDKs) decodes as absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent<T> {
    #[serde(rename = "type", default)]
    pub change_type: ChangeType,
    #[serde(default, deserialize_with = "deserialize_index")]
    pub old_index: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_index")]
    pub new_index: Option<usize>,
    pub item: T,
}

impl<T> ChangeEvent<T> {
    pub fn new(
        change_type: ChangeType,
        item: T,
        old_index: Option<usize>,
        new_index: Option<usize>,
    ) -> Self {
        Self {
            change_type,
            old_index,
            new_index,
            item,
        }
    }

    pub fn added(item: T, new_index: usize) -> Self {
        Self::new(ChangeType::Added, item, None, Some(new_index))
    }

    pub fn modified(item: T, old_index: usize, new_index: usize) -> Self {
        Self::new(ChangeType::Modified, item, Some(old_index), Some(new_index))
    }

    pub fn removed(item: T, old_index: usize) -> Self {
        Self::new(ChangeType::Removed, item, Some(old_index), None)
    }

    pub fn moved(item: T, old_index: usize, new_index: usize) -> Self {
        Self::new(ChangeType::Moved, item, Some(old_index), Some(new_index))
    }

    pub fn map<U, F>(self, f: F) -> ChangeEvent<U>
    where
        F: FnOnce(T) -> U,
    {
        ChangeEvent {
            change_type: self.change_type,
            old_index: self.old_index,
            new_index: self.new_index,
            item: f(self.item),
        }
    }
}

fn deserialize_index<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| usize::try_from(value).ok()))
}

/// Events delivered together, applied strictly in order.
pub type EventBatch<T> = Vec<ChangeEvent<T>>;

/// Identity comparison between items of a collection.
///
/// Two items with the same identity denote the same remote entity, possibly
/// with different payloads.
pub trait Identity {
    fn same_identity(&self, other: &Self) -> bool;
}

impl Identity for String {
    fn same_identity(&self, other: &Self) -> bool {
        self == other
    }
}

impl Identity for &str {
    fn same_identity(&self, other: &Self) -> bool {
        self == other
    }
}

/// Keys and ids are their own identity. Payload types such as tuples or
/// records need an explicit predicate, see `apply_change_by`.
macro_rules! impl_scalar_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn same_identity(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_scalar_identity!(char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Options accepted when a change subscription starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenOptions {
    pub events: ChangeTypeSet,
}

impl ListenOptions {
    pub fn with_events<I>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = ChangeType>,
    {
        self.events = events.into_iter().collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_set_contains_every_known_type() {
        let set = ChangeTypeSet::default();
        for change_type in ChangeType::ALL {
            assert!(set.contains(change_type));
        }
        assert!(!set.contains(ChangeType::Unknown));
    }

    #[test]
    fn set_collects_from_iterator() {
        let set: ChangeTypeSet = [ChangeType::Added, ChangeType::Removed].into_iter().collect();
        assert!(set.contains(ChangeType::Added));
        assert!(!set.contains(ChangeType::Modified));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ChangeType::Added, ChangeType::Removed]
        );
        assert_eq!(format!("{set:?}"), "{Added, Removed}");
    }

    #[test]
    fn unknown_cannot_be_added_to_a_set() {
        let set = ChangeTypeSet::empty().with(ChangeType::Unknown);
        assert!(set.is_empty());
    }

    #[test]
    fn decodes_wire_events() {
        let event: ChangeEvent<String> = serde_json::from_value(json!({
            "type": "added",
            "oldIndex": -1,
            "newIndex": 3,
            "item": "a"
        }))
        .unwrap();
        assert_eq!(event, ChangeEvent::added("a".to_string(), 3));
    }

    #[test]
    fn unrecognised_or_missing_type_decodes_as_unknown() {
        let renamed: ChangeEvent<String> =
            serde_json::from_value(json!({"type": "metadata", "item": "a"})).unwrap();
        assert_eq!(renamed.change_type, ChangeType::Unknown);

        let missing: ChangeEvent<String> = serde_json::from_value(json!({"item": "a"})).unwrap();
        assert_eq!(missing.change_type, ChangeType::Unknown);
        assert_eq!(missing.old_index, None);
    }

    #[test]
    fn listen_options_restrict_events() {
        let options = ListenOptions::default().with_events([ChangeType::Added]);
        assert!(options.events.contains(ChangeType::Added));
        assert!(!options.events.contains(ChangeType::Removed));
    }
}
