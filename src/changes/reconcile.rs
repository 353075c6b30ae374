use log::debug;

use crate::changes::error::{contract_violation, ChangesError, ChangesResult};
use crate::changes::sequence::OrderedSequence;
use crate::changes::types::{ChangeEvent, ChangeType, Identity};

/// Positional edit derived from a single change event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Splice {
    Skip,
    Insert(usize),
    Replace(usize),
    /// Removes the occupant of `from` (when there is one) and inserts the
    /// event's item at `to`, relative to the post-removal sequence.
    Relocate {
        from: Option<usize>,
        to: usize,
    },
    /// Same as `Relocate` but reinserts the existing element.
    Move {
        from: usize,
        to: usize,
    },
    Remove(usize),
}

/// Folds a single change event into `current`, comparing identities with `T::same_identity`.
pub fn apply_change<T>(
    current: &OrderedSequence<T>,
    change: &ChangeEvent<T>,
) -> ChangesResult<OrderedSequence<T>>
where
    T: Clone + Identity,
{
    apply_change_by(current, change, T::same_identity)
}

/// Folds a single change event into `current`, comparing identities with `same_item`.
///
/// Stale events (the expected position holds another item) and duplicate adds
/// return `current` unchanged, sharing its allocation. Indices that cannot be
/// applied to the current sequence are a contract violation and leave
/// `current` untouched.
pub fn apply_change_by<T, F>(
    current: &OrderedSequence<T>,
    change: &ChangeEvent<T>,
    same_item: F,
) -> ChangesResult<OrderedSequence<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let splice = plan_splice(current.as_slice(), change, &same_item)?;
    let sequence = match splice {
        Splice::Skip => current.clone(),
        Splice::Insert(at) => current.splice_copy(|items| items.insert(at, change.item.clone())),
        Splice::Replace(at) => current.splice_copy(|items| items[at] = change.item.clone()),
        Splice::Relocate { from, to } => current.splice_copy(|items| {
            if let Some(from) = from {
                items.remove(from);
            }
            items.insert(to, change.item.clone());
        }),
        Splice::Move { from, to } => current.splice_copy(|items| {
            let existing = items.remove(from);
            items.insert(to, existing);
        }),
        Splice::Remove(at) => current.splice_copy(|items| {
            items.remove(at);
        }),
    };
    Ok(sequence)
}

/// Folds a whole batch into `current`, one event at a time and in order.
pub fn apply_batch<T>(
    current: &OrderedSequence<T>,
    batch: &[ChangeEvent<T>],
) -> ChangesResult<OrderedSequence<T>>
where
    T: Clone + Identity,
{
    apply_batch_by(current, batch, T::same_identity)
}

/// Folds a whole batch into `current` using `same_item` as identity predicate.
///
/// Either every event is applied or, on the first contract violation, an
/// error is returned and `current` is left as it was.
pub fn apply_batch_by<T, F>(
    current: &OrderedSequence<T>,
    batch: &[ChangeEvent<T>],
    same_item: F,
) -> ChangesResult<OrderedSequence<T>>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    batch
        .iter()
        .enumerate()
        .try_fold(current.clone(), |sequence, (position, change)| {
            apply_change_by(&sequence, change, &same_item).map_err(|err| {
                ChangesError::new(
                    err.code.clone(),
                    format!("{} at batch position {position}", err.message()),
                )
            })
        })
}

fn plan_splice<T, F>(current: &[T], change: &ChangeEvent<T>, same_item: &F) -> ChangesResult<Splice>
where
    F: Fn(&T, &T) -> bool,
{
    let len = current.len();
    let item = &change.item;
    let contains_item = || current.iter().any(|existing| same_item(existing, item));

    match change.change_type {
        ChangeType::Added => {
            let new_index = required_index(change.change_type, "new_index", change.new_index)?;
            ensure_index(change.change_type, "new_index", new_index, len)?;
            if current
                .get(new_index)
                .is_some_and(|existing| same_item(existing, item))
            {
                debug!("skipping duplicate added event at index {new_index}");
                return Ok(Splice::Skip);
            }
            if contains_item() {
                debug!("skipping added event for an item already present in the sequence");
                return Ok(Splice::Skip);
            }
            Ok(Splice::Insert(new_index))
        }
        ChangeType::Modified => {
            let old_index = required_index(change.change_type, "old_index", change.old_index)?;
            let new_index = required_index(change.change_type, "new_index", change.new_index)?;
            match current.get(old_index) {
                Some(existing) if !same_item(existing, item) => {
                    debug!("skipping stale modified event at index {old_index}");
                    Ok(Splice::Skip)
                }
                Some(_) if old_index == new_index => Ok(Splice::Replace(old_index)),
                Some(_) => {
                    ensure_index(change.change_type, "new_index", new_index, len - 1)?;
                    Ok(Splice::Relocate {
                        from: Some(old_index),
                        to: new_index,
                    })
                }
                None => {
                    ensure_index(change.change_type, "new_index", new_index, len)?;
                    if contains_item() {
                        debug!("skipping modified event whose item sits outside old_index {old_index}");
                        return Ok(Splice::Skip);
                    }
                    Ok(Splice::Relocate {
                        from: None,
                        to: new_index,
                    })
                }
            }
        }
        ChangeType::Removed => {
            let old_index = required_index(change.change_type, "old_index", change.old_index)?;
            match current.get(old_index) {
                Some(existing) if same_item(existing, item) => Ok(Splice::Remove(old_index)),
                _ => {
                    debug!("skipping stale removed event at index {old_index}");
                    Ok(Splice::Skip)
                }
            }
        }
        ChangeType::Moved => {
            let old_index = required_index(change.change_type, "old_index", change.old_index)?;
            let new_index = required_index(change.change_type, "new_index", change.new_index)?;
            match current.get(old_index) {
                Some(existing) if same_item(existing, item) => {
                    ensure_index(change.change_type, "new_index", new_index, len - 1)?;
                    Ok(Splice::Move {
                        from: old_index,
                        to: new_index,
                    })
                }
                _ => {
                    debug!("skipping stale moved event at index {old_index}");
                    Ok(Splice::Skip)
                }
            }
        }
        ChangeType::Unknown => Ok(Splice::Skip),
    }
}

fn required_index(
    change_type: ChangeType,
    field: &str,
    index: Option<usize>,
) -> ChangesResult<usize> {
    index.ok_or_else(|| contract_violation(format!("{change_type} event is missing {field}")))
}

/// `max` is the largest insertion point accepted, i.e. the length of the
/// sequence the index is resolved against.
fn ensure_index(change_type: ChangeType, field: &str, index: usize, max: usize) -> ChangesResult<()> {
    if index > max {
        return Err(contract_violation(format!(
            "{change_type} event {field} {index} is out of range (max {max})"
        )));
    }
    Ok(())
}
