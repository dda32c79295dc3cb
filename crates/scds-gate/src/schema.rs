use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde_json::Value;

use scds_types::Document;

use crate::config::{SchemaConfig, SchemaScope};
use crate::error::{GateError, GateResult};
use crate::result::SchemaError;

/// A compiled schema together with the rule deciding when it applies.
pub struct Schema {
    name: String,
    scope: SchemaScope,
    field: String,
    pattern: Option<Regex>,
    validator: jsonschema::Validator,
}

impl Schema {
    /// Load the schema document named by `config`.
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn load(config: &SchemaConfig, base_dir: &Path) -> GateResult<Self> {
        let path = base_dir.join(&config.file);
        let text = std::fs::read_to_string(&path).map_err(|source| GateError::Io {
            path: path.clone(),
            source,
        })?;
        let document: Value =
            serde_json::from_str(&text).map_err(|e| GateError::InvalidSchema {
                name: config.name.clone(),
                reason: e.to_string(),
            })?;
        Self::from_document(config, &document)
    }

    /// Compile an already-parsed schema document. `config.file` is ignored.
    pub fn from_document(config: &SchemaConfig, document: &Value) -> GateResult<Self> {
        let scope: SchemaScope = config.scope.parse()?;
        if scope == SchemaScope::Value && config.field.is_empty() {
            return Err(GateError::MissingField(config.name.clone()));
        }

        let pattern = match scope {
            SchemaScope::All => None,
            SchemaScope::Object => Some(compile_anchored(&config.name, &config.pattern)?),
            SchemaScope::Value if config.pattern.is_empty() => None,
            SchemaScope::Value => Some(compile_anchored(&config.name, &config.pattern)?),
        };

        let validator =
            jsonschema::validator_for(document).map_err(|e| GateError::InvalidSchema {
                name: config.name.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name: config.name.clone(),
            scope,
            field: config.field.clone(),
            pattern,
            validator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> SchemaScope {
        self.scope
    }

    /// Whether this schema applies to a write of `value` under `key`.
    pub fn applies_to(&self, key: &str, value: &Document) -> bool {
        match self.scope {
            SchemaScope::All => true,
            SchemaScope::Object => self.pattern.as_ref().is_some_and(|re| re.is_match(key)),
            SchemaScope::Value => match (value.get(&self.field), &self.pattern) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(v), Some(re)) => re.is_match(&coerce(v)),
            },
        }
    }

    /// Run JSON Schema validation, returning every failure.
    pub fn check(&self, instance: &Value) -> Vec<SchemaError> {
        self.validator
            .iter_errors(instance)
            .map(|e| SchemaError {
                kind: keyword(&e.schema_path.to_string()),
                field: field_path(&e.instance_path.to_string()),
                description: e.to_string(),
            })
            .collect()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("field", &self.field)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .finish()
    }
}

fn compile_anchored(name: &str, pattern: &str) -> GateResult<Regex> {
    Regex::new(&anchored(pattern)).map_err(|source| GateError::InvalidPattern {
        name: name.to_string(),
        source,
    })
}

/// Wrap the whole pattern so alternations cannot escape the anchors.
fn anchored(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

/// Strings match as-is; everything else as its JSON text.
fn coerce(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// `/authors/0` becomes `authors.0`; the empty pointer is `(root)`.
fn field_path(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        "(root)".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

/// Last segment of the schema path: the failing keyword.
fn keyword(schema_path: &str) -> String {
    schema_path
        .rsplit('/')
        .find(|seg| !seg.is_empty())
        .unwrap_or("schema")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(scope: &str, field: &str, pattern: &str) -> SchemaConfig {
        SchemaConfig {
            name: "test".into(),
            scope: scope.into(),
            field: field.into(),
            pattern: pattern.into(),
            file: "unused.json".into(),
        }
    }

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    fn permissive(scope: &str, field: &str, pattern: &str) -> Schema {
        Schema::from_document(&config(scope, field, pattern), &json!({})).unwrap()
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    #[test]
    fn anchoring() {
        assert_eq!(anchored("book"), "^(?:book)$");
        assert_eq!(anchored("^users:.*"), "^(?:^users:.*)$");
        assert_eq!(anchored("users|admins"), "^(?:users|admins)$");
        assert_eq!(anchored(""), "^(?:)$");
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce(&json!("book")), "book");
        assert_eq!(coerce(&json!(1001)), "1001");
        assert_eq!(coerce(&json!(true)), "true");
        assert_eq!(coerce(&json!(null)), "null");
    }

    #[test]
    fn paths_and_keywords() {
        assert_eq!(field_path(""), "(root)");
        assert_eq!(field_path("/authors/0"), "authors.0");
        assert_eq!(keyword("/properties/type/enum"), "enum");
        assert_eq!(keyword("/required"), "required");
        assert_eq!(keyword(""), "schema");
    }

    // -----------------------------------------------------------------------
    // Scope matching
    // -----------------------------------------------------------------------

    #[test]
    fn empty_scope_always_applies() {
        let schema = permissive("", "", "");
        assert!(schema.applies_to("anything", &Document::new()));
    }

    #[test]
    fn object_scope_matches_whole_key() {
        let schema = permissive("object", "", "users\\..*");
        assert!(schema.applies_to("users.jdoe", &Document::new()));
        assert!(!schema.applies_to("admins.users.jdoe", &Document::new()));
    }

    #[test]
    fn alternation_matches_whole_key() {
        let schema = permissive("object", "", "users|admins");
        assert!(schema.applies_to("users", &Document::new()));
        assert!(schema.applies_to("admins", &Document::new()));
        assert!(!schema.applies_to("usersXYZ", &Document::new()));
        assert!(!schema.applies_to("superadmins", &Document::new()));

        let anchored_already = permissive("object", "", "^users$|^admins$");
        assert!(anchored_already.applies_to("admins", &Document::new()));
        assert!(!anchored_already.applies_to("usersXYZ", &Document::new()));
    }

    #[test]
    fn value_scope_presence_only() {
        let schema = permissive("value", "type", "");
        assert!(schema.applies_to("k", &doc(json!({"type": null}))));
        assert!(!schema.applies_to("k", &doc(json!({"kind": "book"}))));
    }

    #[test]
    fn value_scope_pattern_is_anchored() {
        let schema = permissive("value", "type", "book");
        assert!(schema.applies_to("k", &doc(json!({"type": "book"}))));
        assert!(!schema.applies_to("k", &doc(json!({"type": "notebook"}))));
        assert!(!schema.applies_to("k", &doc(json!({"type": "user"}))));
    }

    #[test]
    fn value_scope_coerces_numbers() {
        let schema = permissive("value", "id", r"1\d{3}");
        assert!(schema.applies_to("k", &doc(json!({"id": 1001}))));
        assert!(!schema.applies_to("k", &doc(json!({"id": 2001}))));
    }

    // -----------------------------------------------------------------------
    // Construction failures
    // -----------------------------------------------------------------------

    #[test]
    fn invalid_scope_rejected() {
        let err = Schema::from_document(&config("document", "", ""), &json!({})).unwrap_err();
        assert!(matches!(err, GateError::InvalidScope(s) if s == "document"));
    }

    #[test]
    fn value_scope_requires_field() {
        let err = Schema::from_document(&config("value", "", "x"), &json!({})).unwrap_err();
        assert!(matches!(err, GateError::MissingField(_)));
    }

    #[test]
    fn bad_pattern_rejected() {
        let err = Schema::from_document(&config("object", "", "("), &json!({})).unwrap_err();
        assert!(matches!(err, GateError::InvalidPattern { .. }));
    }

    #[test]
    fn bad_schema_rejected() {
        let err =
            Schema::from_document(&config("", "", ""), &json!({"type": 12})).unwrap_err();
        assert!(matches!(err, GateError::InvalidSchema { .. }));
    }

    #[test]
    fn missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config("", "", "");
        cfg.file = "missing.json".into();
        let err = Schema::load(&cfg, dir.path()).unwrap_err();
        assert!(matches!(err, GateError::Io { .. }));
    }

    // -----------------------------------------------------------------------
    // Checking
    // -----------------------------------------------------------------------

    #[test]
    fn check_reports_keyword_and_field() {
        let schema = Schema::from_document(
            &config("", "", ""),
            &json!({
                "type": "object",
                "required": ["title"],
                "properties": {"authors": {"type": "array", "items": {"type": "string"}}}
            }),
        )
        .unwrap();

        assert!(schema.check(&json!({"title": "x", "authors": ["a"]})).is_empty());

        let errors = schema.check(&json!({"authors": ["a", 2]}));
        assert_eq!(errors.len(), 2);
        let required = errors.iter().find(|e| e.kind == "required").unwrap();
        assert_eq!(required.field, "(root)");
        assert!(required.description.contains("title"));
        let item = errors.iter().find(|e| e.kind == "type").unwrap();
        assert_eq!(item.field, "authors.1");
    }
}
