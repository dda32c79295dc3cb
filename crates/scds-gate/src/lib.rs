//! Schema gate for SCDS.
//!
//! Every incoming document passes through the gate before it can be written.
//! The gate holds a set of JSON Schemas, each with a scope rule deciding
//! whether it applies to a given write:
//!
//! - `""` -- always
//! - `"object"` -- when the pattern matches the object key
//! - `"value"` -- when the document has the configured field, and, if a
//!   pattern is set, the field's value matches it
//!
//! Patterns must match the whole key or field value.
//!
//! # Quick Start
//!
//! ```rust
//! use scds_gate::{Schema, SchemaConfig, SchemaSet};
//! use serde_json::json;
//!
//! let config = SchemaConfig {
//!     name: "book".into(),
//!     scope: "value".into(),
//!     field: "type".into(),
//!     pattern: "book".into(),
//!     ..Default::default()
//! };
//! let schema = Schema::from_document(&config, &json!({"required": ["title"]})).unwrap();
//! let set = SchemaSet::new(vec![schema]).unwrap();
//!
//! let value = serde_json::from_value(json!({"type": "book"})).unwrap();
//! let result = set.validate("library.1", &value);
//! assert_eq!(result.matches(), vec!["book"]);
//! assert!(!result.is_valid());
//! ```

pub mod config;
pub mod error;
pub mod result;
pub mod schema;
pub mod set;

pub use config::{SchemaConfig, SchemaScope};
pub use error::{GateError, GateResult};
pub use result::{SchemaError, SchemaErrors, ValidationResult};
pub use schema::Schema;
pub use set::SchemaSet;
