//! Foundation types for the slowly-changing document store (SCDS).
//!
//! This crate provides the data model shared by every other SCDS crate:
//! documents, versioned objects and their revisions, plus the two small
//! utilities that sit in front of every request (key validation and
//! time-string parsing).
//!
//! # Key Types
//!
//! - [`Document`]: Top-level field map of a JSON object
//! - [`Revision`] / [`Change`]: One committed transition of a document
//! - [`Object`]: A keyed document with its current state and history
//! - [`ObjectId`]: Immutable UUID v7 identity assigned at creation
//! - [`parse_time_string`]: Relative duration, layout cascade, or epoch seconds

pub mod error;
pub mod key;
pub mod object;
pub mod revision;
pub mod temporal;

pub use error::TypeError;
pub use key::{is_valid_key, validate_key};
pub use object::{Object, ObjectId};
pub use revision::{Change, Document, Revision};
pub use temporal::{now_unix, parse_duration, parse_time_string, parse_time_string_at};
