//! # Change reconciliation
//!
//! Turns batches of positional change events into the ordered view of a
//! remote collection. This is the engine behind the realtime database `list`
//! helpers and the Firestore `sorted_changes` helpers.
//!
//! ## Features
//!
//! - Event-type filtering of change batches
//! - Copy-on-write reconciliation of `added`, `modified`, `removed` and `moved` events
//! - Duplicate and stale event suppression based on item identity
//! - First-emission-always emission gate
//! - Audit trail and sorted view accumulators
//!
//! ## Example
//!
//! ```
//! use firebase_rs_rx::changes::{apply_batch, ChangeEvent, OrderedSequence};
//!
//! let sequence = OrderedSequence::from(vec![1u32, 2, 3]);
//! let next = apply_batch(&sequence, &[ChangeEvent::moved(1, 0, 2)]).unwrap();
//! assert_eq!(next, vec![2, 3, 1]);
//! assert_eq!(sequence, vec![1, 2, 3]);
//! ```

mod emission;
pub mod error;
mod filter;
mod reconcile;
mod sequence;
mod types;
mod views;

#[doc(inline)]
pub use emission::EmissionGate;

#[doc(inline)]
pub use error::{ChangesError, ChangesErrorCode, ChangesResult};

#[doc(inline)]
pub use filter::filter_events;

#[doc(inline)]
pub use reconcile::{apply_batch, apply_batch_by, apply_change, apply_change_by};

#[doc(inline)]
pub use sequence::OrderedSequence;

#[doc(inline)]
pub use types::{ChangeEvent, ChangeType, ChangeTypeSet, EventBatch, Identity, ListenOptions};

#[doc(inline)]
pub use views::{AuditTrail, SortedView};
