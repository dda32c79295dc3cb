use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::revision::{Document, Revision};

/// Immutable identity of an object, assigned when it is first stored.
///
/// UUID v7, so identifiers sort in creation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(uuid::Uuid);

impl ObjectId {
    /// Generate a new time-ordered object ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidObjectId(format!("{s}: {e}")))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_id())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A keyed, versioned document.
///
/// `value`, `version`, and `time` are the materialized current state and
/// always equal the result of replaying `history` from an empty document.
/// `history` is empty when the object was read without it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub key: String,
    pub value: Document,
    pub version: u64,
    pub time: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Revision>,
}

impl Object {
    /// An object with identity only: empty value, version 0, no history.
    ///
    /// This is the starting state for replay.
    pub fn empty(id: ObjectId, key: impl Into<String>) -> Self {
        Self {
            id,
            key: key.into(),
            value: Document::new(),
            version: 0,
            time: 0,
            history: Vec::new(),
        }
    }

    /// Create a new object from its first revision.
    pub fn create(key: impl Into<String>, value: Document, first: Revision) -> Self {
        Self {
            id: ObjectId::new(),
            key: key.into(),
            value,
            version: first.version,
            time: first.time,
            history: vec![first],
        }
    }

    /// Returns `true` if at least one revision has been applied.
    pub fn exists(&self) -> bool {
        self.version > 0
    }

    /// The most recent revision, if history was loaded.
    pub fn latest_revision(&self) -> Option<&Revision> {
        self.history.last()
    }

    /// Drop the history, keeping the current state.
    pub fn without_history(mut self) -> Self {
        self.history = Vec::new();
        self
    }
}
