use crate::changes::error::ChangesResult;
use crate::changes::reconcile::apply_batch_by;
use crate::changes::sequence::OrderedSequence;
use crate::changes::types::{ChangeEvent, Identity};

/// Append-only log of every accepted change event, in arrival order.
///
/// The log grows without bound for as long as the subscription lives.
/// Handing out the log is a reference-count bump; a later append copies it
/// only while an earlier snapshot is still alive.
#[derive(Clone, Debug)]
pub struct AuditTrail<T> {
    events: OrderedSequence<ChangeEvent<T>>,
}

impl<T: Clone> AuditTrail<T> {
    pub fn new() -> Self {
        Self {
            events: OrderedSequence::new(),
        }
    }

    pub fn record(&mut self, batch: &[ChangeEvent<T>]) -> &OrderedSequence<ChangeEvent<T>> {
        self.events.append(batch);
        &self.events
    }

    pub fn events(&self) -> &OrderedSequence<ChangeEvent<T>> {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<T: Clone> Default for AuditTrail<T> {
    fn default() -> Self {
        Self::new()
    }
}

type SameItemFn<T> = Box<dyn Fn(&T, &T) -> bool + Send + Sync>;

/// Running reconciliation fold starting from an empty sequence.
///
/// [`SortedView::apply`] only hands back a sequence when it differs from the
/// one handed back previously.
pub struct SortedView<T> {
    current: OrderedSequence<T>,
    last_emitted: Option<OrderedSequence<T>>,
    same_item: SameItemFn<T>,
}

impl<T> SortedView<T>
where
    T: Clone + PartialEq,
{
    pub fn new() -> Self
    where
        T: Identity + 'static,
    {
        Self::with_identity(T::same_identity)
    }

    pub fn with_identity<F>(same_item: F) -> Self
    where
        F: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        Self {
            current: OrderedSequence::new(),
            last_emitted: None,
            same_item: Box::new(same_item),
        }
    }

    pub fn current(&self) -> &OrderedSequence<T> {
        &self.current
    }

    /// Folds `batch` into the view. On error the view keeps its previous state.
    pub fn apply(&mut self, batch: &[ChangeEvent<T>]) -> ChangesResult<Option<OrderedSequence<T>>> {
        let next = apply_batch_by(&self.current, batch, &self.same_item)?;
        self.current = next;
        let unchanged = self
            .last_emitted
            .as_ref()
            .is_some_and(|last| *last == self.current);
        if unchanged {
            return Ok(None);
        }
        self.last_emitted = Some(self.current.clone());
        Ok(Some(self.current.clone()))
    }
}

impl<T> Default for SortedView<T>
where
    T: Clone + PartialEq + Identity + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
