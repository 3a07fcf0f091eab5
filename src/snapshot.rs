//! The snapshot publisher boundary.
//!
//! [`SnapshotStore`] is what the serving layer reads: it holds the latest
//! published [`Snapshot`] behind an atomic swap. Reads never block a run;
//! a run in progress publishes nothing until it finishes. Before the first
//! successful run, [`SnapshotStore::latest`] is `None`, and the serving
//! layer maps that to its "not ready" response instead of an empty result.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::models::Snapshot;

/// Shared, read-mostly holder of the last published snapshot.
///
/// Publishing fully replaces the previous snapshot; snapshots themselves are
/// immutable, so readers holding an `Arc` from before a swap keep a
/// consistent view.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    latest: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        SnapshotStore::default()
    }

    /// Atomically swap in a freshly built snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let events = snapshot.events.len();
        let status = snapshot.status;
        *self.latest.write().expect("snapshot lock poisoned") = Some(Arc::new(snapshot));
        info!(events, ?status, "Published snapshot");
    }

    /// The last published snapshot, or `None` if no run has ever published.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.latest.read().expect("snapshot lock poisoned").clone()
    }
}
