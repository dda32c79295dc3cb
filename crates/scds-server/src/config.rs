use serde::{Deserialize, Serialize};

/// HTTP listener settings, the `[http]` section of `scds.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Answer cross-origin requests from any origin.
    pub cors: bool,
}

impl ServerConfig {
    /// `host:port` as accepted by [`tokio::net::TcpListener::bind`].
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5000,
            cors: false,
        }
    }
}
