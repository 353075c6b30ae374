//! # Realtime Database adapter
//!
//! Turns the key-positioned child events of a realtime database location
//! (`child_added`, `child_changed`, `child_removed`, `child_moved`, each with
//! the key of the previous sibling) into index-based change batches, and
//! exposes the list views built on top of them.
//!
//! ## Features
//!
//! - `list_changes`: change batches in occurrence order
//! - `list` / `list_val`: the ordered children, as snapshots or plain values
//! - `audit_trail`: every change seen so far
//! - `object_val`: value stream of a single location with an optional key field
//!
//! ## Example
//!
//! ```rust
//! use firebase_rs_rx::changes::ListenOptions;
//! use firebase_rs_rx::database::{list_val, ChildEvent, ChildEventType, DataSnapshot};
//! use firebase_rs_rx::observable::{MemorySource, Observable};
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! let source = MemorySource::new();
//! let values = Arc::new(Mutex::new(Vec::new()));
//! let captured = Arc::clone(&values);
//! let _subscription = list_val(
//!     Observable::from_source(source.clone()),
//!     &ListenOptions::default(),
//!     Some("key".to_string()),
//! )
//! .subscribe_next(move |items| *captured.lock().unwrap() = items.clone());
//!
//! source.emit(ChildEvent::initial_batch(vec![
//!     DataSnapshot::new("ada", json!({ "born": 1815 })),
//!     DataSnapshot::new("alan", json!({ "born": 1912 })),
//! ]));
//! source.emit(vec![ChildEvent::new(
//!     ChildEventType::Added,
//!     DataSnapshot::new("grace", json!({ "born": 1906 })),
//!     Some("ada".to_string()),
//! )]);
//!
//! let keys: Vec<_> = values.lock().unwrap().iter().map(|v| v["key"].clone()).collect();
//! assert_eq!(keys, vec![json!("ada"), json!("grace"), json!("alan")]);
//! ```

mod api;
mod list;
mod object;

#[doc(inline)]
pub use api::{ChildEvent, ChildEventType, DataSnapshot};

#[doc(inline)]
pub use list::{audit_trail, index_child_event, list, list_changes, list_val};

#[doc(inline)]
pub use object::{change_to_data, object_val};
