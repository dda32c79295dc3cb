use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// One `[[schemas]]` entry as written in configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Name reported in matches and errors.
    pub name: String,
    /// `""`, `"object"`, or `"value"`.
    #[serde(default)]
    pub scope: String,
    /// Top-level field inspected by `value` scope.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub field: String,
    /// Regular expression that must match the whole key or field value.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    /// Path to the JSON Schema document.
    pub file: PathBuf,
}

/// When a schema applies to a write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaScope {
    /// Every document.
    All,
    /// Documents whose key matches the pattern.
    Object,
    /// Documents carrying the field, optionally with a matching value.
    Value,
}

impl FromStr for SchemaScope {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::All),
            "object" => Ok(Self::Object),
            "value" => Ok(Self::Value),
            other => Err(GateError::InvalidScope(other.to_string())),
        }
    }
}

impl fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "",
            Self::Object => "object",
            Self::Value => "value",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parsing() {
        assert_eq!("".parse::<SchemaScope>().unwrap(), SchemaScope::All);
        assert_eq!("object".parse::<SchemaScope>().unwrap(), SchemaScope::Object);
        assert_eq!("value".parse::<SchemaScope>().unwrap(), SchemaScope::Value);
        assert!(matches!(
            "Value".parse::<SchemaScope>(),
            Err(GateError::InvalidScope(s)) if s == "Value"
        ));
    }

    #[test]
    fn config_defaults() {
        let cfg: SchemaConfig = serde_json::from_str(r#"{"name": "any", "file": "any.json"}"#).unwrap();
        assert_eq!(cfg.scope, "");
        assert!(cfg.field.is_empty());
        assert!(cfg.pattern.is_empty());
    }
}
