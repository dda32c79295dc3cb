use std::sync::Arc;

use tokio::net::TcpListener;

use scds_sdk::Scds;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// SCDS HTTP server.
pub struct ScdsServer {
    config: ServerConfig,
    scds: Arc<Scds>,
}

impl ScdsServer {
    pub fn new(config: ServerConfig, scds: Arc<Scds>) -> Self {
        Self { config, scds }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.scds), &self.config)
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(cors = self.config.cors, "SCDS server listening on {addr}");
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
