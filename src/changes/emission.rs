/// Decides which batches of a subscription reach downstream subscribers.
///
/// The first batch always passes, even when empty, since it tells the
/// subscriber what the collection looks like right now. Later batches only
/// pass when they carry at least one event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmissionGate {
    emitted: bool,
}

impl EmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit<E>(&mut self, batch: &[E]) -> bool {
        let first = !self.emitted;
        self.emitted = true;
        first || !batch.is_empty()
    }
}
