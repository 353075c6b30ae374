use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::changes::{ChangeEvent, Identity};

/// Metadata about the state of a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    from_cache: bool,
    has_pending_writes: bool,
}

impl SnapshotMetadata {
    /// Creates metadata with the provided cache/pending-write flags.
    pub const fn new(from_cache: bool, has_pending_writes: bool) -> Self {
        Self {
            from_cache,
            has_pending_writes,
        }
    }

    /// Indicates whether the snapshot was served from a local cache.
    pub fn from_cache(&self) -> bool {
        self.from_cache
    }

    /// Indicates whether the snapshot contains uncommitted local mutations.
    pub fn has_pending_writes(&self) -> bool {
        self.has_pending_writes
    }
}

/// Snapshot of a single document, identified by its full path
/// (`cities/sf`, `cities/sf/landmarks/bridge`).
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSnapshot {
    path: String,
    data: Option<Map<String, Value>>,
    metadata: SnapshotMetadata,
}

impl DocumentSnapshot {
    pub fn new(
        path: impl Into<String>,
        data: Option<Map<String, Value>>,
        metadata: SnapshotMetadata,
    ) -> Self {
        Self {
            path: path.into(),
            data,
            metadata,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last segment of the document path.
    pub fn id(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns whether the document exists on the backend.
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref()
    }

    /// Returns snapshot metadata describing cache and mutation state.
    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }
}

impl Identity for DocumentSnapshot {
    fn same_identity(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

/// A document change reported by a query snapshot.
pub type DocumentChange = ChangeEvent<DocumentSnapshot>;

/// Result of a query: the documents in query order and the changes since the
/// previous snapshot of the same listener.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySnapshot {
    documents: Vec<DocumentSnapshot>,
    doc_changes: Vec<DocumentChange>,
    metadata: SnapshotMetadata,
}

impl QuerySnapshot {
    pub fn new(
        documents: Vec<DocumentSnapshot>,
        doc_changes: Vec<DocumentChange>,
        metadata: SnapshotMetadata,
    ) -> Self {
        Self {
            documents,
            doc_changes,
            metadata,
        }
    }

    /// First snapshot of a listener: every document is reported as added.
    pub fn initial(documents: Vec<DocumentSnapshot>, metadata: SnapshotMetadata) -> Self {
        let doc_changes = documents
            .iter()
            .enumerate()
            .map(|(index, document)| ChangeEvent::added(document.clone(), index))
            .collect();
        Self::new(documents, doc_changes, metadata)
    }

    /// Returns all document snapshots returned by the query.
    pub fn documents(&self) -> &[DocumentSnapshot] {
        &self.documents
    }

    /// Changes since the previous snapshot, without metadata-only changes.
    pub fn doc_changes(&self) -> &[DocumentChange] {
        &self.doc_changes
    }

    pub fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Options passed to the query listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotListenOptions {
    /// Also raise snapshots when only the metadata changed.
    pub include_metadata_changes: bool,
}

impl Default for SnapshotListenOptions {
    fn default() -> Self {
        Self {
            include_metadata_changes: true,
        }
    }
}

impl SnapshotListenOptions {
    pub fn with_metadata_changes(mut self, include: bool) -> Self {
        self.include_metadata_changes = include;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn metadata_flags() {
        let meta = SnapshotMetadata::new(true, false);
        assert!(meta.from_cache());
        assert!(!meta.has_pending_writes());
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            json!({ "fromCache": true, "hasPendingWrites": false })
        );
    }

    #[test]
    fn snapshot_reports_existence_and_id() {
        let missing = DocumentSnapshot::new("cities/sf", None, SnapshotMetadata::default());
        assert!(!missing.exists());
        assert_eq!(missing.id(), "sf");

        let nested = DocumentSnapshot::new(
            "cities/sf/landmarks/bridge",
            Some(fields(json!({ "name": "Golden Gate" }))),
            SnapshotMetadata::default(),
        );
        assert!(nested.exists());
        assert_eq!(nested.id(), "bridge");
    }

    #[test]
    fn identity_ignores_data_and_metadata() {
        let local = DocumentSnapshot::new("cities/sf", None, SnapshotMetadata::new(false, true));
        let synced = DocumentSnapshot::new(
            "cities/sf",
            Some(fields(json!({ "pop": 1 }))),
            SnapshotMetadata::default(),
        );
        assert!(local.same_identity(&synced));
        assert!(!local.same_identity(&DocumentSnapshot::new(
            "cities/la",
            None,
            SnapshotMetadata::default()
        )));
    }

    #[test]
    fn initial_snapshot_adds_every_document() {
        let docs = vec![
            DocumentSnapshot::new("cities/la", None, SnapshotMetadata::default()),
            DocumentSnapshot::new("cities/sf", None, SnapshotMetadata::default()),
        ];
        let snapshot = QuerySnapshot::initial(docs.clone(), SnapshotMetadata::new(true, false));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(
            snapshot.doc_changes(),
            &[ChangeEvent::added(docs[0].clone(), 0), ChangeEvent::added(docs[1].clone(), 1)]
        );
    }

    #[test]
    fn listen_options_include_metadata_by_default() {
        assert!(SnapshotListenOptions::default().include_metadata_changes);
        assert!(!SnapshotListenOptions::default()
            .with_metadata_changes(false)
            .include_metadata_changes);
    }
}
