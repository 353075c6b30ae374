use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Immutable, ordered view of a remote collection, kept identity-unique by
/// the reconciliation functions.
///
/// Clones share the same allocation, and a shared allocation is never mutated:
/// a structural change produces a new allocation, so
/// [`OrderedSequence::ptr_eq`] tells two consecutive emissions apart without
/// comparing their contents.
pub struct OrderedSequence<T> {
    items: Arc<Vec<T>>,
}

impl<T> OrderedSequence<T> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Vec::new()),
        }
    }

    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Returns whether both sequences share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.as_ref().clone()
    }

    /// Appends `tail`, copying the items first only when the allocation is
    /// shared with another clone.
    pub(crate) fn append(&mut self, tail: &[T])
    where
        T: Clone,
    {
        if !tail.is_empty() {
            Arc::make_mut(&mut self.items).extend_from_slice(tail);
        }
    }

    pub(crate) fn splice_copy<F>(&self, edit: F) -> Self
    where
        T: Clone,
        F: FnOnce(&mut Vec<T>),
    {
        let mut items = self.to_vec();
        edit(&mut items);
        Self::from(items)
    }
}

impl<T> Clone for OrderedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for OrderedSequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for OrderedSequence<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T> From<Vec<T>> for OrderedSequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}

impl<T> FromIterator<T> for OrderedSequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T: PartialEq> PartialEq for OrderedSequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.items == other.items
    }
}

impl<T: Eq> Eq for OrderedSequence<T> {}

impl<T: PartialEq> PartialEq<Vec<T>> for OrderedSequence<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a OrderedSequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
