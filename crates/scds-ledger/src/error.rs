use scds_types::ObjectId;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("integrity violation in {key} at version {version}: {reason}")]
    IntegrityViolation {
        key: String,
        version: u64,
        reason: String,
    },

    #[error("history not loaded for object {0}")]
    HistoryNotLoaded(ObjectId),
}

/// Convenience alias for ledger results.
pub type LedgerResult<T> = Result<T, LedgerError>;
