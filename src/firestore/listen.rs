use std::sync::Arc;

use crate::changes::ChangesResult;
use crate::firestore::snapshot::{DocumentSnapshot, QuerySnapshot, SnapshotListenOptions};
use crate::observable::{FnSource, Observable, SourceCallback, Subscription};

/// A query that can be listened to, e.g. a collection reference.
pub trait QuerySource: Send + Sync {
    /// Registers `callback` for every snapshot of the query. Dropping the
    /// returned subscription detaches the listener.
    fn on_snapshot(
        &self,
        options: SnapshotListenOptions,
        callback: SourceCallback<QuerySnapshot>,
    ) -> ChangesResult<Subscription>;
}

/// A single document that can be listened to.
pub trait DocumentSource: Send + Sync {
    fn on_snapshot(
        &self,
        options: SnapshotListenOptions,
        callback: SourceCallback<DocumentSnapshot>,
    ) -> ChangesResult<Subscription>;
}

impl<Q> QuerySource for Arc<Q>
where
    Q: QuerySource + ?Sized,
{
    fn on_snapshot(
        &self,
        options: SnapshotListenOptions,
        callback: SourceCallback<QuerySnapshot>,
    ) -> ChangesResult<Subscription> {
        (**self).on_snapshot(options, callback)
    }
}

impl<D> DocumentSource for Arc<D>
where
    D: DocumentSource + ?Sized,
{
    fn on_snapshot(
        &self,
        options: SnapshotListenOptions,
        callback: SourceCallback<DocumentSnapshot>,
    ) -> ChangesResult<Subscription> {
        (**self).on_snapshot(options, callback)
    }
}

/// Snapshots of `query`, one listener per subscription.
pub fn from_query<Q>(query: Q, options: SnapshotListenOptions) -> Observable<QuerySnapshot>
where
    Q: QuerySource + 'static,
{
    Observable::from_source(FnSource::new(
        move |callback: SourceCallback<QuerySnapshot>| query.on_snapshot(options, callback),
    ))
}

/// Snapshots of a single document, metadata changes included.
pub fn doc<D>(document: D) -> Observable<DocumentSnapshot>
where
    D: DocumentSource + 'static,
{
    Observable::from_source(FnSource::new(move |callback: SourceCallback<DocumentSnapshot>| {
        document.on_snapshot(SnapshotListenOptions::default(), callback)
    }))
}
