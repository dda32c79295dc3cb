use thiserror::Error;

use scds_gate::{GateError, SchemaErrors};
use scds_ledger::LedgerError;
use scds_store::StoreError;
use scds_types::TypeError;

#[derive(Debug, Error)]
pub enum ScdsError {
    #[error("key contains invalid chars: {0}")]
    InvalidKey(String),

    #[error("validation failed:\n{0}")]
    ValidationFailed(SchemaErrors),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage conflict: {0}")]
    StorageConflict(#[source] StoreError),

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("schema error: {0}")]
    Gate(#[from] GateError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl From<StoreError> for ScdsError {
    fn from(e: StoreError) -> Self {
        if e.is_conflict() {
            Self::StorageConflict(e)
        } else {
            Self::Storage(e)
        }
    }
}

impl From<TypeError> for ScdsError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidKey(key) => Self::InvalidKey(key),
            other => Self::Parse(other.to_string()),
        }
    }
}

pub type ScdsResult<T> = Result<T, ScdsError>;
