//! Sorted query results and the change audit trail of a document-store query.
//!
//! `ScriptedQuery` stands in for a collection reference: it replays a fixed
//! series of query snapshots to every listener.

use std::sync::Arc;

use firebase_rs_rx::changes::{ChangeEvent, ChangesResult};
use firebase_rs_rx::firestore::{
    audit_trail, default_listen_options, from_query, sorted_changes, DocumentSnapshot,
    QuerySnapshot, QuerySource, SnapshotListenOptions, SnapshotMetadata,
};
use firebase_rs_rx::observable::{SourceCallback, Subscription};
use serde_json::{json, Map};

struct ScriptedQuery {
    snapshots: Vec<QuerySnapshot>,
}

impl QuerySource for ScriptedQuery {
    fn on_snapshot(
        &self,
        _options: SnapshotListenOptions,
        callback: SourceCallback<QuerySnapshot>,
    ) -> ChangesResult<Subscription> {
        for snapshot in &self.snapshots {
            callback(Ok(snapshot.clone()));
        }
        Ok(Subscription::empty())
    }
}

fn score(name: &str, points: u32, metadata: SnapshotMetadata) -> DocumentSnapshot {
    let mut fields = Map::new();
    fields.insert("points".to_string(), json!(points));
    DocumentSnapshot::new(format!("scores/{name}"), Some(fields), metadata)
}

fn main() {
    let pending = SnapshotMetadata::new(false, true);
    let synced = SnapshotMetadata::default();

    let query = Arc::new(ScriptedQuery {
        snapshots: vec![
            QuerySnapshot::initial(
                vec![score("ada", 12, synced), score("alan", 9, synced)],
                synced,
            ),
            QuerySnapshot::new(
                vec![score("grace", 15, pending), score("ada", 12, synced), score("alan", 9, synced)],
                vec![ChangeEvent::added(score("grace", 15, pending), 0)],
                pending,
            ),
            QuerySnapshot::new(
                vec![score("grace", 15, synced), score("ada", 12, synced), score("alan", 9, synced)],
                Vec::new(),
                synced,
            ),
        ],
    });

    let _leaderboard = sorted_changes(
        from_query(Arc::clone(&query), SnapshotListenOptions::default()),
        &default_listen_options(),
    )
    .subscribe_next(|documents| {
        let rows: Vec<String> = documents
            .iter()
            .map(|document| {
                let marker = if document.metadata().has_pending_writes() { "*" } else { "" };
                format!("{}{}", document.id(), marker)
            })
            .collect();
        println!("leaderboard: {}", rows.join(" > "));
    });

    let _audit = audit_trail(
        from_query(query, SnapshotListenOptions::default()),
        &default_listen_options(),
    )
    .subscribe_next(|events| println!("{} changes recorded", events.len()));
}
