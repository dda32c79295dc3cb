use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::{self, AppState};

/// Build the axum router with all SCDS endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/keys", get(handler::keys_handler))
        .route(
            "/objects/:key",
            get(handler::get_handler).put(handler::put_handler),
        )
        .route("/objects/:key/v/:version", get(handler::version_handler))
        .route("/objects/:key/t/:time", get(handler::time_handler))
        .route("/objects/:key/log", get(handler::log_handler))
        .route("/objects/:key/verify", get(handler::verify_handler))
        .route("/log/:key", get(handler::log_handler))
        .route("/validate/:key", post(handler::validate_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
