use std::path::PathBuf;

/// Errors raised while loading schemas.
///
/// Validation itself cannot fail: everything that can go wrong is caught
/// when the [`SchemaSet`](crate::SchemaSet) is built.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The schema file could not be read.
    #[error("cannot read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not valid JSON or not a valid JSON Schema.
    #[error("invalid schema '{name}': {reason}")]
    InvalidSchema { name: String, reason: String },

    /// The scope is not one of `""`, `"object"`, `"value"`.
    #[error("invalid schema scope: {0}")]
    InvalidScope(String),

    /// The scope pattern does not compile.
    #[error("invalid pattern for schema '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Two schemas share a name.
    #[error("duplicate schema name: {0}")]
    DuplicateName(String),

    /// A `value`-scoped schema names no field.
    #[error("schema '{0}' has value scope but no field")]
    MissingField(String),
}

/// Convenience alias for gate results.
pub type GateResult<T> = Result<T, GateError>;
