//! # Document store adapter
//!
//! Views over query and document snapshots: change batches with synthesized
//! metadata changes, the sorted document list, the audit trail and plain data
//! mappings with an optional id field.

mod collection;
mod document;
mod listen;
mod snapshot;

#[doc(inline)]
pub use collection::{
    audit_trail, collection, collection_changes, collection_data, default_listen_options,
    sorted_changes, with_metadata_changes,
};

#[doc(inline)]
pub use document::{doc_data, snap_to_data};

#[doc(inline)]
pub use listen::{doc, from_query, DocumentSource, QuerySource};

#[doc(inline)]
pub use snapshot::{
    DocumentChange, DocumentSnapshot, QuerySnapshot, SnapshotListenOptions, SnapshotMetadata,
};
