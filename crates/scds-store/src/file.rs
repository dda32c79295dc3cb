//! File-backed object store.
//!
//! The whole store is one JSON document on disk. Every mutation is applied
//! to a copy of the in-memory snapshot, the copy is written to a temp file
//! in the same directory and renamed over the old file, and only then does
//! the copy replace the in-memory state. A failed write leaves both the file
//! and the in-memory state untouched.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;
use tracing::debug;

use scds_types::{Object, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::model::{ObjectPatch, Projection, Subscriber};
use crate::snapshot::Snapshot;
use crate::traits::{ObjectStore, SubscriberStore};

pub struct FileStore {
    path: PathBuf,
    state: RwLock<Snapshot>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file does not
    /// exist. Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            Snapshot::from_json(&bytes)?
        } else {
            Snapshot::default()
        };
        debug!(path = %path.display(), objects = state.object_count(), "opened file store");

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.state.read().expect("lock poisoned").object_count()
    }

    /// Returns `true` if the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to a copy of the state, persist the copy, then publish it.
    fn mutate<T>(&self, f: impl FnOnce(&mut Snapshot) -> StoreResult<T>) -> StoreResult<T> {
        let mut state = self.state.write().expect("lock poisoned");
        let mut next = state.clone();
        let out = f(&mut next)?;
        self.persist(&next)?;
        *state = next;
        Ok(out)
    }

    fn persist(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, snapshot)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl ObjectStore for FileStore {
    fn find_by_key(&self, key: &str, projection: Projection) -> StoreResult<Option<Object>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.find_by_key(key, projection))
    }

    fn insert(&self, object: &Object) -> StoreResult<()> {
        self.mutate(|state| state.insert(object))
    }

    fn conditional_update(
        &self,
        id: ObjectId,
        expected_version: u64,
        patch: ObjectPatch,
    ) -> StoreResult<Object> {
        self.mutate(|state| state.conditional_update(id, expected_version, patch))
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.keys())
    }
}

impl SubscriberStore for FileStore {
    fn upsert_subscriber(&self, email: &str) -> StoreResult<Option<Subscriber>> {
        self.mutate(|state| Ok(state.upsert_subscriber(email)))
    }

    fn remove_subscriber_by_email(&self, email: &str) -> StoreResult<bool> {
        self.mutate(|state| Ok(state.remove_subscriber_by_email(email)))
    }

    fn remove_subscriber_by_id(&self, id: uuid::Uuid) -> StoreResult<bool> {
        self.mutate(|state| Ok(state.remove_subscriber_by_id(id)))
    }

    fn subscribers(&self) -> StoreResult<Vec<Subscriber>> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.subscribers())
    }
}

impl std::fmt::Debug for FileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("object_count", &self.len())
            .finish()
    }
}
