//! Revision history for SCDS.
//!
//! An object's current state is, by construction, the fold of its ordered
//! revisions over an empty document. This crate provides:
//! - [`apply_revision`], the pure fold step
//! - [`ReplayEngine`] for full replay and time travel by version or time
//! - [`HistoryValidator`] for checking a stored history against its
//!   materialized state

pub mod error;
pub mod replay;
pub mod validation;

pub use error::{LedgerError, LedgerResult};
pub use replay::{apply_revision, ReplayEngine};
pub use validation::{HistoryValidator, ValidationReport, Violation, ViolationKind};
