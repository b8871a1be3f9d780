//! Terminal batch snapshots for export and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::label::BatchSnapshot;

/// Read-mostly store of finished batches.
///
/// A snapshot is inserted only after the batch's event stream has fully
/// terminated; readers never observe a partial batch.
#[derive(Debug, Clone, Default)]
pub struct BatchStore {
    inner: Arc<RwLock<HashMap<String, BatchSnapshot>>>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, snapshot: BatchSnapshot) {
        self.inner.write().insert(snapshot.batch_id.clone(), snapshot);
    }

    /// Final snapshot for a batch, if that batch has terminated.
    pub fn snapshot(&self, batch_id: &str) -> Option<BatchSnapshot> {
        self.inner.read().get(batch_id).cloned()
    }
}
