//! Diff engine for SCDS.
//!
//! Compares two document states field by field at the top level and produces
//! an unstamped [`Revision`](scds_types::Revision) describing the
//! transition, or `None` when the states are equal.
//!
//! # Key Functions
//!
//! - [`diff`] -- Additions, removals, and changes between two documents
//! - [`diff_from_empty`] -- Pure-addition revision for a new document
//! - [`values_equal`] -- Deep value equality with numbers compared by value

pub mod document_diff;

pub use document_diff::{diff, diff_from_empty, values_equal};
