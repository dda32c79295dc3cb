use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use scds_types::Document;

use crate::config::SchemaConfig;
use crate::error::{GateError, GateResult};
use crate::result::ValidationResult;
use crate::schema::Schema;

// ---------------------------------------------------------------------------
// SchemaSet
// ---------------------------------------------------------------------------

/// The immutable set of schemas every write is checked against.
///
/// Built once at startup. Each schema decides for itself whether it applies
/// to a given write; the result records every schema that applied.
#[derive(Debug, Default)]
pub struct SchemaSet {
    schemas: Vec<Schema>,
}

impl SchemaSet {
    /// A set with no schemas. Every document is valid.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a set from compiled schemas. Names must be unique.
    pub fn new(schemas: Vec<Schema>) -> GateResult<Self> {
        let mut seen = HashSet::new();
        for schema in &schemas {
            if !seen.insert(schema.name()) {
                return Err(GateError::DuplicateName(schema.name().to_string()));
            }
        }
        Ok(Self { schemas })
    }

    /// Load every configured schema, resolving relative files against
    /// `base_dir`. Any failure aborts loading.
    pub fn load(configs: &[SchemaConfig], base_dir: &Path) -> GateResult<Self> {
        let schemas = configs
            .iter()
            .map(|cfg| Schema::load(cfg, base_dir))
            .collect::<GateResult<Vec<_>>>()?;
        debug!(count = schemas.len(), "loaded schemas");
        Self::new(schemas)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Names in configuration order.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.iter().map(Schema::name).collect()
    }

    /// Validate `value`, about to be written under `key`, against every
    /// applicable schema.
    pub fn validate(&self, key: &str, value: &Document) -> ValidationResult {
        let mut result = ValidationResult::default();
        if self.schemas.is_empty() {
            return result;
        }

        let instance = Value::Object(value.clone().into_iter().collect());
        for schema in &self.schemas {
            if !schema.applies_to(key, value) {
                debug!(schema = schema.name(), scope = %schema.scope(), key, "schema skipped");
                continue;
            }
            let errors = schema.check(&instance);
            debug!(schema = schema.name(), key, errors = errors.len(), "schema evaluated");
            result.record(schema.name(), errors);
        }
        result
    }
}
