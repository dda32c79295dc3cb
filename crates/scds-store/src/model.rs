use serde::{Deserialize, Serialize};

use scds_types::{Document, Object, Revision};

/// Which parts of an object a lookup returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    /// Identity and current state, without history.
    #[default]
    Summary,
    /// Current state and full history.
    Full,
    /// Identity and history, with an empty value.
    History,
}

impl Projection {
    /// Shape a stored object according to this projection.
    pub fn apply(self, object: &Object) -> Object {
        match self {
            Self::Full => object.clone(),
            Self::Summary => Object {
                history: Vec::new(),
                ..object.clone()
            },
            Self::History => Object {
                value: Document::new(),
                ..object.clone()
            },
        }
    }
}

/// The mutation applied by a conditional update: the new materialized state
/// and the revision that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectPatch {
    pub value: Document,
    pub revision: Revision,
}

impl ObjectPatch {
    pub fn new(value: Document, revision: Revision) -> Self {
        Self { value, revision }
    }
}

/// An email address that receives change notifications.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: uuid::Uuid,
    /// Lower-cased, unique across the store.
    pub email: String,
    /// Subscription time in seconds since the UNIX epoch.
    pub time: i64,
}

impl Subscriber {
    pub fn new(email: &str) -> Self {
        Self {
            id: uuid::Uuid::now_v7(),
            email: email.to_lowercase(),
            time: scds_types::now_unix(),
        }
    }
}
