use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A document value: the top-level fields of a JSON object.
///
/// Field values are arbitrary JSON and are treated as opaque by the diff
/// engine. `BTreeMap` keeps iteration and serialization order stable.
pub type Document = BTreeMap<String, Value>;

/// The old and new value of a top-level field present in both states.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub before: Value,
    pub after: Value,
}

impl Change {
    pub fn new(before: Value, after: Value) -> Self {
        Self { before, after }
    }
}

/// One committed transition of an object.
///
/// A revision produced by the diff engine carries version `0` and time `0`
/// until it is stamped by the put protocol. A revision whose three maps are
/// all empty is never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Positive, strictly increasing per object, starting at 1.
    pub version: u64,
    /// Commit time in seconds since the UNIX epoch (UTC).
    pub time: i64,
    /// Fields present in the new state but absent from the old.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additions: Document,
    /// Fields present in the old state but absent from the new.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub removals: Document,
    /// Fields present in both states whose values differ.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub changes: BTreeMap<String, Change>,
}

impl Revision {
    /// Returns `true` if the revision carries no effective change.
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty() && self.changes.is_empty()
    }

    /// Number of fields touched by this revision.
    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len() + self.changes.len()
    }

    /// Assign the version and commit time.
    pub fn stamp(mut self, version: u64, time: i64) -> Self {
        self.version = version;
        self.time = time;
        self
    }
}
