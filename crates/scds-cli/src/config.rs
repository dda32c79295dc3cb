//! `scds.toml` loading with `SCDS_*` environment overrides.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use scds_sdk::{FileStore, LogMailer, SchemaConfig, SchemaSet, Scds, SubscriberNotifier};
use scds_server::ServerConfig;

pub const DEFAULT_FILE: &str = "scds.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    /// File-backed store location.
    pub data: PathBuf,
    pub http: ServerConfig,
    pub notify: NotifyConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<SchemaConfig>,
    /// Directory relative schema files are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            data: PathBuf::from("scds.json"),
            http: ServerConfig::default(),
            notify: NotifyConfig::default(),
            schemas: Vec::new(),
            base_dir: PathBuf::from("."),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub from: String,
    /// Prefix of the links in notification bodies.
    pub base_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            from: "scds@localhost".into(),
            base_url: "http://localhost:5000".into(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from `./scds.toml` if it exists,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_FILE).is_file() => Self::from_file(Path::new(DEFAULT_FILE))?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.base_dir = dir.to_path_buf();
        }
        Ok(config)
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Apply `SCDS_DEBUG`, `SCDS_DATA`, `SCDS_HTTP_HOST`, `SCDS_HTTP_PORT`,
    /// and `SCDS_HTTP_CORS` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(v) = lookup("SCDS_DEBUG") {
            self.debug = parse_bool("SCDS_DEBUG", &v)?;
        }
        if let Some(v) = lookup("SCDS_DATA") {
            self.data = PathBuf::from(v);
        }
        if let Some(v) = lookup("SCDS_HTTP_HOST") {
            self.http.host = v;
        }
        if let Some(v) = lookup("SCDS_HTTP_PORT") {
            self.http.port = v
                .parse()
                .with_context(|| format!("SCDS_HTTP_PORT: invalid port {v:?}"))?;
        }
        if let Some(v) = lookup("SCDS_HTTP_CORS") {
            self.http.cors = parse_bool("SCDS_HTTP_CORS", &v)?;
        }
        Ok(())
    }

    /// Open the store and build the configured instance. Schema load
    /// failures are fatal.
    pub fn open(&self) -> anyhow::Result<Scds> {
        let store = Arc::new(
            FileStore::open(&self.data)
                .with_context(|| format!("open store {}", self.data.display()))?,
        );
        let schemas = SchemaSet::load(&self.schemas, &self.base_dir).context("load schemas")?;

        let scds = Scds::new(store.clone()).with_schemas(schemas);
        if !self.notify.enabled {
            return Ok(scds);
        }
        Ok(scds.with_notifier(SubscriberNotifier::new(
            store,
            LogMailer,
            self.notify.from.clone(),
            self.notify.base_url.clone(),
        )))
    }
}

fn parse_bool(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{name}: expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE: &str = r#"
debug = true
data = "/var/lib/scds/store.json"

[http]
host = "0.0.0.0"
port = 8080

[notify]
enabled = true
from = "noreply@example.com"

[[schemas]]
name = "book"
scope = "value"
field = "type"
pattern = "book"
file = "schemas/book.json"
"#;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn parses_all_sections() {
        let c = Config::from_toml(SAMPLE).unwrap();
        assert!(c.debug);
        assert_eq!(c.data, PathBuf::from("/var/lib/scds/store.json"));
        assert_eq!(c.http.addr(), "0.0.0.0:8080");
        assert!(!c.http.cors);
        assert!(c.notify.enabled);
        assert_eq!(c.notify.from, "noreply@example.com");
        assert_eq!(c.notify.base_url, "http://localhost:5000");
        assert_eq!(c.schemas.len(), 1);
        assert_eq!(c.schemas[0].field, "type");
    }

    #[test]
    fn printed_config_parses_back() {
        let c = Config::from_toml(SAMPLE).unwrap();
        let text = c.to_toml().unwrap();
        assert!(text.contains("[http]"));
        assert!(text.contains("[[schemas]]"));
        assert_eq!(Config::from_toml(&text).unwrap(), c);
    }

    #[test]
    fn unknown_scope_fails_at_open() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("s.json"), "{}").unwrap();
        let config = Config {
            data: dir.path().join("store.json"),
            base_dir: dir.path().to_path_buf(),
            schemas: vec![SchemaConfig {
                name: "s".into(),
                scope: "everything".into(),
                file: "s.json".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(config.open().is_err());
    }

    // -----------------------------------------------------------------------
    // Files and environment
    // -----------------------------------------------------------------------

    #[test]
    fn schema_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        std::fs::write(
            dir.path().join("schemas/book.json"),
            r#"{"required": ["title"]}"#,
        )
        .unwrap();
        let path = dir.path().join("scds.toml");
        let text = SAMPLE.replace(
            "/var/lib/scds/store.json",
            &dir.path().join("store.json").display().to_string().replace('\\', "/"),
        );
        std::fs::write(&path, text).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.base_dir, dir.path());
        let scds = config.open().unwrap();
        assert_eq!(scds.schemas().names(), vec!["book"]);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn environment_overrides_file() {
        let mut c = Config::from_toml(SAMPLE).unwrap();
        c.apply_env(env(&[
            ("SCDS_DEBUG", "false"),
            ("SCDS_DATA", "other.json"),
            ("SCDS_HTTP_PORT", "9000"),
            ("SCDS_HTTP_CORS", "1"),
        ]))
        .unwrap();
        assert!(!c.debug);
        assert_eq!(c.data, PathBuf::from("other.json"));
        assert_eq!(c.http.port, 9000);
        assert_eq!(c.http.host, "0.0.0.0");
        assert!(c.http.cors);
    }

    #[test]
    fn invalid_environment_values_are_rejected() {
        let mut c = Config::default();
        assert!(c.apply_env(env(&[("SCDS_HTTP_PORT", "http")])).is_err());
        assert!(c.apply_env(env(&[("SCDS_DEBUG", "maybe")])).is_err());
    }
}
