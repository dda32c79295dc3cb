use scds_types::{Object, ObjectId};

use crate::error::StoreResult;
use crate::model::{ObjectPatch, Projection, Subscriber};

/// Keyed, versioned object store.
///
/// All implementations must satisfy these invariants:
/// - Keys are unique. A second insert for the same key fails.
/// - An object's ID never changes once inserted.
/// - `conditional_update` is the only way to change a stored object, and it
///   compares the stored version and applies the patch atomically.
/// - History is append-only.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Look up an object by key.
    ///
    /// Returns `Ok(None)` if no object has this key.
    fn find_by_key(&self, key: &str, projection: Projection) -> StoreResult<Option<Object>>;

    /// Store a newly created object.
    ///
    /// Fails with [`StoreError::DuplicateKey`](crate::StoreError::DuplicateKey)
    /// if the key is taken, which is how a lost creation race surfaces.
    fn insert(&self, object: &Object) -> StoreResult<()>;

    /// Replace value, version, and time and append the patch's revision, but
    /// only if the stored version equals `expected_version`.
    ///
    /// Returns the updated object with its full history.
    fn conditional_update(
        &self,
        id: ObjectId,
        expected_version: u64,
        patch: ObjectPatch,
    ) -> StoreResult<Object>;

    /// All keys in ascending order.
    fn keys(&self) -> StoreResult<Vec<String>>;
}

/// Store of notification subscribers, unique by email.
pub trait SubscriberStore: Send + Sync {
    /// Insert a subscriber for `email` unless one exists.
    ///
    /// Returns the subscriber only when newly created.
    fn upsert_subscriber(&self, email: &str) -> StoreResult<Option<Subscriber>>;

    /// Remove by email. Returns `true` if a subscriber was removed.
    fn remove_subscriber_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Remove by ID. Returns `true` if a subscriber was removed.
    fn remove_subscriber_by_id(&self, id: uuid::Uuid) -> StoreResult<bool>;

    /// All subscribers ordered by email.
    fn subscribers(&self) -> StoreResult<Vec<Subscriber>>;
}
