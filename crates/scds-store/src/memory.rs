use std::sync::RwLock;

use scds_types::{Object, ObjectId};

use crate::error::StoreResult;
use crate::model::{ObjectPatch, Projection, Subscriber};
use crate::snapshot::Snapshot;
use crate::traits::{ObjectStore, SubscriberStore};

/// In-memory object store.
///
/// Intended for tests and embedding. Everything is held behind one
/// `RwLock`; the write lock spans the version check and the update, which
/// makes `conditional_update` atomic.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<Snapshot>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").object_count()
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for InMemoryStore {
    fn find_by_key(&self, key: &str, projection: Projection) -> StoreResult<Option<Object>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.find_by_key(key, projection))
    }

    fn insert(&self, object: &Object) -> StoreResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        state.insert(object)
    }

    fn conditional_update(
        &self,
        id: ObjectId,
        expected_version: u64,
        patch: ObjectPatch,
    ) -> StoreResult<Object> {
        let mut state = self.state.write().expect("lock poisoned");
        state.conditional_update(id, expected_version, patch)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.keys())
    }
}

impl SubscriberStore for InMemoryStore {
    fn upsert_subscriber(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        let mut state = self.state.write().expect("lock poisoned");
        Ok(state.upsert_subscriber(email))
    }

    fn remove_subscriber_by_email(&self, email: &str) -> StoreResult<bool> {
        let mut state = self.state.write().expect("lock poisoned");
        Ok(state.remove_subscriber_by_email(email))
    }

    fn remove_subscriber_by_id(&self, id: uuid::Uuid) -> StoreResult<bool> {
        let mut state = self.state.write().expect("lock poisoned");
        Ok(state.remove_subscriber_by_id(id))
    }

    fn subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.subscribers())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("object_count", &self.len())
            .finish()
    }
}
