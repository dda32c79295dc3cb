//! High-level SDK for the slowly-changing document store.
//!
//! [`Scds`] ties the subsystems together: keys and documents from
//! `scds-types`, diffs from `scds-diff`, replay from `scds-ledger`, storage
//! from `scds-store`, and schema validation from `scds-gate`. This is the
//! main entry point for the server and the CLI.
//!
//! ```
//! use scds_sdk::Scds;
//! use serde_json::json;
//!
//! let scds = Scds::in_memory();
//! let doc = serde_json::from_value(json!({"name": "Bob"})).unwrap();
//! let rev = scds.put("bob", doc).unwrap().unwrap();
//! assert_eq!(rev.version, 1);
//! ```

pub mod error;
pub mod notify;
pub mod scds;

pub use error::{ScdsError, ScdsResult};
pub use notify::{
    LogMailer, Mailer, Message, NoopNotifier, Notification, Notifier, NotifyError,
    SubscriberNotifier,
};
pub use scds::Scds;

// Re-export key types
pub use scds_gate::{Schema, SchemaConfig, SchemaErrors, SchemaSet, ValidationResult};
pub use scds_ledger::ValidationReport;
pub use scds_store::{FileStore, InMemoryStore, StoreError, Subscriber};
pub use scds_types::{Change, Document, Object, ObjectId, Revision};
