use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

/// One JSON Schema failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaError {
    /// The keyword that failed, e.g. `required` or `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Dotted path of the offending value, `(root)` for the document.
    pub field: String,
    pub description: String,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.description)
    }
}

/// Failures by schema name, for failed schemas only.
///
/// Serializes as `null` when empty and otherwise as a list of
/// `{"schema": name, "errors": [...]}` entries ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaErrors(BTreeMap<String, Vec<SchemaError>>);

impl SchemaErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, schema: &str) -> Option<&[SchemaError]> {
        self.0.get(schema).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[SchemaError])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (schema, errors) in &self.0 {
            writeln!(f, "{schema}")?;
            for err in errors {
                writeln!(f, "- {err}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for SchemaErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            schema: &'a str,
            errors: &'a [SchemaError],
        }

        if self.0.is_empty() {
            return serializer.serialize_none();
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (schema, errors) in &self.0 {
            seq.serialize_element(&Entry { schema, errors })?;
        }
        seq.end()
    }
}

/// Outcome of validating one document against a [`SchemaSet`](crate::SchemaSet).
///
/// Holds an entry for every schema that applied; an empty error list means
/// the schema passed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationResult {
    results: BTreeMap<String, Vec<SchemaError>>,
}

impl ValidationResult {
    pub(crate) fn record(&mut self, schema: &str, errors: Vec<SchemaError>) {
        self.results.insert(schema.to_string(), errors);
    }

    /// Sorted names of the schemas that applied.
    pub fn matches(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }

    /// `true` iff every applied schema passed. Vacuously true when none applied.
    pub fn is_valid(&self) -> bool {
        self.results.values().all(Vec::is_empty)
    }

    /// Failures of the schemas that did not pass.
    pub fn errors(&self) -> SchemaErrors {
        SchemaErrors(
            self.results
                .iter()
                .filter(|(_, errs)| !errs.is_empty())
                .map(|(name, errs)| (name.clone(), errs.clone()))
                .collect(),
        )
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 3)?;
        state.serialize_field("matches", &self.matches())?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}
