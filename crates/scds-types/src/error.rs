use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("key contains invalid chars: {0}")]
    InvalidKey(String),

    #[error("could not parse time: {0}")]
    InvalidTime(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}
