//! # Observable change streams
//!
//! Listener-style sources (register a callback, get a handle back, detach
//! later) exposed as lazily subscribed observables and as
//! [`futures::Stream`]s.
//!
//! ## Features
//!
//! - `Source` trait for listener registrations, with closure and in-memory implementations
//! - `Observable` with per-subscriber pipeline state and RAII `Subscription` handles
//! - `collection_changes`, `sorted_changes`, `audit_trail` and `ordered_snapshot` pipelines
//! - `share_replay` to share one listener and replay the latest value to late subscribers
//! - `into_stream` bridge for async consumers
//!
//! ## Example
//!
//! ```
//! use firebase_rs_rx::changes::{ChangeEvent, EventBatch, ListenOptions};
//! use firebase_rs_rx::observable::{sorted_changes, MemorySource, Observable};
//! use std::sync::{Arc, Mutex};
//!
//! let source = MemorySource::<EventBatch<u32>>::new();
//! let sorted = sorted_changes(Observable::from_source(source.clone()), &ListenOptions::default());
//!
//! let latest = Arc::new(Mutex::new(Vec::new()));
//! let captured = Arc::clone(&latest);
//! let subscription = sorted.subscribe_next(move |items| {
//!     *captured.lock().unwrap() = items.to_vec();
//! });
//!
//! source.emit(vec![ChangeEvent::added(7, 0), ChangeEvent::added(3, 0)]);
//! assert_eq!(*latest.lock().unwrap(), vec![3, 7]);
//!
//! subscription.unsubscribe();
//! assert_eq!(source.listener_count(), 0);
//! ```

mod api;
mod observer;
mod pipeline;
mod source;
mod stream;
mod subscription;

#[doc(inline)]
pub use api::Observable;

#[doc(inline)]
pub use observer::{CompleteFn, ErrorFn, NextFn, PartialObserver, Subscriber};

#[doc(inline)]
pub use pipeline::{audit_trail, collection_changes, ordered_snapshot, sorted_changes, sorted_changes_by};

#[doc(inline)]
pub use source::{FnSource, MemorySource, Source, SourceCallback};

#[doc(inline)]
pub use stream::ObservableStream;

#[doc(inline)]
pub use subscription::{Subscription, Unsubscribe};
