//! The collections behind every backend.
//!
//! [`Snapshot`] holds the objects and subscribers and implements the store
//! semantics on plain `&mut self`. Backends wrap it in a lock and decide
//! what happens after a mutation.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use scds_types::{Object, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::model::{ObjectPatch, Projection, Subscriber};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    /// Objects with full history, by key.
    #[serde(default)]
    objects: BTreeMap<String, Object>,
    /// Subscribers by lower-cased email.
    #[serde(default)]
    subscribers: BTreeMap<String, Subscriber>,
    /// Key of each object ID.
    #[serde(skip)]
    ids: HashMap<ObjectId, String>,
}

impl Snapshot {
    /// Decode a snapshot and rebuild the ID index.
    pub fn from_json(bytes: &[u8]) -> StoreResult<Self> {
        let mut snapshot: Self = serde_json::from_slice(bytes)?;
        snapshot.ids = snapshot
            .objects
            .iter()
            .map(|(key, obj)| (obj.id, key.clone()))
            .collect();
        Ok(snapshot)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn find_by_key(&self, key: &str, projection: Projection) -> Option<Object> {
        self.objects.get(key).map(|obj| projection.apply(obj))
    }

    pub fn insert(&mut self, object: &Object) -> StoreResult<()> {
        if self.objects.contains_key(&object.key) {
            return Err(StoreError::DuplicateKey(object.key.clone()));
        }
        self.ids.insert(object.id, object.key.clone());
        self.objects.insert(object.key.clone(), object.clone());
        Ok(())
    }

    pub fn conditional_update(
        &mut self,
        id: ObjectId,
        expected_version: u64,
        patch: ObjectPatch,
    ) -> StoreResult<Object> {
        let object = self
            .ids
            .get(&id)
            .and_then(|key| self.objects.get_mut(key))
            .ok_or(StoreError::NotFound(id))?;

        if object.version != expected_version {
            return Err(StoreError::Conflict {
                id,
                expected: expected_version,
                actual: object.version,
            });
        }

        object.value = patch.value;
        object.version = patch.revision.version;
        object.time = patch.revision.time;
        object.history.push(patch.revision);
        Ok(object.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    pub fn upsert_subscriber(&mut self, email: &str) -> Option<Subscriber> {
        let email = email.to_lowercase();
        if self.subscribers.contains_key(&email) {
            return None;
        }
        let subscriber = Subscriber::new(&email);
        self.subscribers.insert(email, subscriber.clone());
        Some(subscriber)
    }

    pub fn remove_subscriber_by_email(&mut self, email: &str) -> bool {
        self.subscribers.remove(&email.to_lowercase()).is_some()
    }

    pub fn remove_subscriber_by_id(&mut self, id: uuid::Uuid) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|_, sub| sub.id != id);
        self.subscribers.len() != before
    }

    pub fn subscribers(&self) -> Vec<Subscriber> {
        self.subscribers.values().cloned().collect()
    }
}
