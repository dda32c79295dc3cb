use scds_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object with the given ID exists.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// An object with the same key already exists.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The stored version moved on since the caller read the object.
    #[error("version conflict for {id}: expected {expected}, found {actual}")]
    Conflict {
        id: ObjectId,
        expected: u64,
        actual: u64,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` for errors caused by a concurrent writer.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::DuplicateKey(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
