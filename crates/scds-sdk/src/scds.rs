use std::sync::Arc;

use tracing::{debug, info, warn};

use scds_gate::{SchemaSet, ValidationResult};
use scds_ledger::{HistoryValidator, ReplayEngine, ValidationReport};
use scds_store::{
    InMemoryStore, ObjectPatch, ObjectStore, Projection, Subscriber, SubscriberStore,
};
use scds_types::{validate_key, Document, Object, Revision};

use crate::error::{ScdsError, ScdsResult};
use crate::notify::{NoopNotifier, Notifier};

type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

/// High-level SCDS API.
///
/// Owns the storage handles, the schema set, and the notifier, all fixed at
/// construction. Every operation runs synchronously on the caller's thread.
pub struct Scds {
    objects: Arc<dyn ObjectStore>,
    subscribers: Arc<dyn SubscriberStore>,
    schemas: SchemaSet,
    notifier: Box<dyn Notifier>,
    clock: Clock,
}

impl Scds {
    /// Create an instance over `store` with no schemas and no notification.
    pub fn new<S>(store: Arc<S>) -> Self
    where
        S: ObjectStore + SubscriberStore + 'static,
    {
        let objects: Arc<dyn ObjectStore> = store.clone();
        Self {
            objects,
            subscribers: store,
            schemas: SchemaSet::empty(),
            notifier: Box::new(NoopNotifier),
            clock: Box::new(scds_types::now_unix),
        }
    }

    /// An instance backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }

    pub fn with_schemas(mut self, schemas: SchemaSet) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Replace the commit clock (seconds since the UNIX epoch).
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    // ---- Write path ----

    /// Store `value` under `key`.
    ///
    /// Returns the committed revision, or `None` when `value` equals the
    /// current state (nothing is written). Creating an object from an empty
    /// document is also a no-op.
    ///
    /// The update is conditional on the version read at the start of the
    /// call; a concurrent writer that got there first turns this call into
    /// [`ScdsError::StorageConflict`]. There is no retry.
    pub fn put(&self, key: &str, value: Document) -> ScdsResult<Option<Revision>> {
        validate_key(key)?;

        let result = self.schemas.validate(key, &value);
        if !result.is_valid() {
            debug!(key, schemas = ?result.matches(), "put rejected by schema");
            return Err(ScdsError::ValidationFailed(result.errors()));
        }

        match self.objects.find_by_key(key, Projection::Summary)? {
            None => self.create(key, value),
            Some(current) => self.update(current, value),
        }
    }

    fn create(&self, key: &str, value: Document) -> ScdsResult<Option<Revision>> {
        let Some(rev) = scds_diff::diff_from_empty(&value) else {
            debug!(key, "empty document, nothing to create");
            return Ok(None);
        };
        let rev = rev.stamp(1, (self.clock)());
        let object = Object::create(key, value, rev.clone());
        self.objects.insert(&object)?;

        info!(key, id = %object.id, fields = rev.len(), "created object");
        self.notify(&object, &rev);
        Ok(Some(rev))
    }

    fn update(&self, current: Object, value: Document) -> ScdsResult<Option<Revision>> {
        let Some(rev) = scds_diff::diff(&current.value, &value) else {
            debug!(key = %current.key, version = current.version, "no change");
            return Ok(None);
        };
        let rev = rev.stamp(current.version + 1, (self.clock)());
        let updated = self.objects.conditional_update(
            current.id,
            current.version,
            ObjectPatch::new(value, rev.clone()),
        )?;

        info!(
            key = %updated.key,
            version = rev.version,
            additions = rev.additions.len(),
            removals = rev.removals.len(),
            changes = rev.changes.len(),
            "committed revision"
        );
        self.notify(&updated, &rev);
        Ok(Some(rev))
    }

    fn notify(&self, object: &Object, revision: &Revision) {
        if let Err(e) = self.notifier.notify(object, revision) {
            warn!(key = %object.key, version = revision.version, error = %e, "notification failed");
        }
    }

    // ---- Read path ----

    /// Current state without history.
    pub fn get(&self, key: &str) -> ScdsResult<Option<Object>> {
        self.find(key, Projection::Summary)
    }

    /// Current state with full history.
    pub fn get_with_history(&self, key: &str) -> ScdsResult<Option<Object>> {
        self.find(key, Projection::Full)
    }

    /// State as of `version`, without history. Version `0` is never found;
    /// a version past the latest returns the current state.
    pub fn get_at_version(&self, key: &str, version: u64) -> ScdsResult<Option<Object>> {
        Ok(self
            .find(key, Projection::Full)?
            .and_then(|obj| ReplayEngine::at_version(&obj, version))
            .map(Object::without_history))
    }

    /// State as of UNIX time `time`, without history. Not found if `time`
    /// predates the object.
    pub fn get_at_time(&self, key: &str, time: i64) -> ScdsResult<Option<Object>> {
        Ok(self
            .find(key, Projection::Full)?
            .and_then(|obj| ReplayEngine::at_time(&obj, time))
            .map(Object::without_history))
    }

    /// Like [`get_at_time`](Self::get_at_time) with a time string: a relative
    /// duration, a date layout, or UNIX seconds.
    pub fn get_at_time_str(&self, key: &str, time: &str) -> ScdsResult<Option<Object>> {
        let time = scds_types::parse_time_string(time)?;
        self.get_at_time(key, time)
    }

    /// All revisions, oldest first.
    pub fn log(&self, key: &str) -> ScdsResult<Option<Vec<Revision>>> {
        Ok(self.find(key, Projection::History)?.map(|obj| obj.history))
    }

    /// All keys, sorted.
    pub fn keys(&self) -> ScdsResult<Vec<String>> {
        Ok(self.objects.keys()?)
    }

    /// Check the stored history of `key` against its materialized state.
    pub fn verify(&self, key: &str) -> ScdsResult<ValidationReport> {
        let obj = self
            .find(key, Projection::Full)?
            .ok_or_else(|| ScdsError::NotFound(key.to_string()))?;
        Ok(HistoryValidator::validate(&obj))
    }

    fn find(&self, key: &str, projection: Projection) -> ScdsResult<Option<Object>> {
        validate_key(key)?;
        Ok(self.objects.find_by_key(key, projection)?)
    }

    /// Run the schema set without writing anything.
    pub fn validate(&self, key: &str, value: &Document) -> ValidationResult {
        self.schemas.validate(key, value)
    }

    // ---- Subscriber operations ----

    /// Subscribe email addresses. Returns only the newly created subscribers.
    pub fn subscribe<I, S>(&self, emails: I) -> ScdsResult<Vec<Subscriber>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut created = Vec::new();
        for email in emails {
            if let Some(sub) = self.subscribers.upsert_subscriber(email.as_ref().trim())? {
                info!(email = %sub.email, "subscribed");
                created.push(sub);
            }
        }
        Ok(created)
    }

    /// Unsubscribe email addresses. Unknown addresses are ignored. Returns
    /// the number removed.
    pub fn unsubscribe<I, S>(&self, emails: I) -> ScdsResult<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for email in emails {
            if self
                .subscribers
                .remove_subscriber_by_email(email.as_ref().trim())?
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Remove a subscriber by ID. Returns `false` if none had the ID.
    pub fn unsubscribe_id(&self, id: uuid::Uuid) -> ScdsResult<bool> {
        Ok(self.subscribers.remove_subscriber_by_id(id)?)
    }

    pub fn subscribers(&self) -> ScdsResult<Vec<Subscriber>> {
        Ok(self.subscribers.subscribers()?)
    }
}

impl std::fmt::Debug for Scds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scds")
            .field("schemas", &self.schemas.names())
            .finish_non_exhaustive()
    }
}
