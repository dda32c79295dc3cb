use serde::Serialize;

use scds_types::Object;

use crate::error::{LedgerError, LedgerResult};
use crate::replay::ReplayEngine;

/// Result of checking one object's history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub key: String,
    pub revision_count: u64,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub version: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    VersionGap,
    EmptyRevision,
    TimeRegression,
    VersionMismatch,
    ValueMismatch,
}

/// History integrity validator.
///
/// Checks that versions run 1..=n without gaps, that no revision is empty,
/// that commit times never go backwards, and that replaying the history
/// reproduces the stored value, version, and time.
pub struct HistoryValidator;

impl HistoryValidator {
    /// Validate an object loaded with its full history.
    pub fn validate(object: &Object) -> ValidationReport {
        let mut violations = Vec::new();
        let mut last_time = i64::MIN;

        for (index, rev) in object.history.iter().enumerate() {
            let expected = index as u64 + 1;
            if rev.version != expected {
                violations.push(Violation {
                    version: rev.version,
                    kind: ViolationKind::VersionGap,
                    description: format!("expected version {expected}, got {}", rev.version),
                });
            }
            if rev.is_empty() {
                violations.push(Violation {
                    version: rev.version,
                    kind: ViolationKind::EmptyRevision,
                    description: "revision carries no change".into(),
                });
            }
            if rev.time < last_time {
                violations.push(Violation {
                    version: rev.version,
                    kind: ViolationKind::TimeRegression,
                    description: format!("time {} precedes previous {last_time}", rev.time),
                });
            }
            last_time = rev.time;
        }

        let replayed = ReplayEngine::replay(object);
        if replayed.version != object.version || replayed.time != object.time {
            violations.push(Violation {
                version: object.version,
                kind: ViolationKind::VersionMismatch,
                description: format!(
                    "stored version {} at {}, history ends at version {} at {}",
                    object.version, object.time, replayed.version, replayed.time
                ),
            });
        }
        if replayed.value != object.value {
            violations.push(Violation {
                version: object.version,
                kind: ViolationKind::ValueMismatch,
                description: "replayed value differs from stored value".into(),
            });
        }

        ValidationReport {
            key: object.key.clone(),
            revision_count: object.history.len() as u64,
            violations,
        }
    }

    /// Validate and convert the first violation into an error.
    pub fn ensure_valid(object: &Object) -> LedgerResult<()> {
        if object.exists() && object.history.is_empty() {
            return Err(LedgerError::HistoryNotLoaded(object.id));
        }
        match Self::validate(object).violations.into_iter().next() {
            None => Ok(()),
            Some(v) => Err(LedgerError::IntegrityViolation {
                key: object.key.clone(),
                version: v.version,
                reason: v.description,
            }),
        }
    }
}
