use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;

use scds_sdk::{Document, Scds, ScdsError, ScdsResult, ValidationReport, ValidationResult};

use crate::error::{ServerError, ServerResult};

pub type AppState = Arc<Scds>;

/// 200 with a JSON body, or 204 when there is nothing to return.
fn found<T: Serialize>(value: Option<T>) -> Response {
    match value {
        Some(v) => Json(v).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

fn parse_document(body: &[u8]) -> ServerResult<Document> {
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "scds-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Run a store call on the blocking pool; file-backed stores write and
/// fsync on every put.
async fn blocking<T, F>(scds: AppState, call: F) -> ServerResult<T>
where
    F: FnOnce(&Scds) -> ScdsResult<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || call(&scds))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(result?)
}

pub async fn keys_handler(State(scds): State<AppState>) -> ServerResult<Json<Vec<String>>> {
    Ok(Json(blocking(scds, |s| s.keys()).await?))
}

pub async fn put_handler(
    State(scds): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> ServerResult<Response> {
    let value = parse_document(&body)?;
    Ok(found(blocking(scds, move |s| s.put(&key, value)).await?))
}

pub async fn get_handler(
    State(scds): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    Ok(found(blocking(scds, move |s| s.get(&key)).await?))
}

/// Versions below 1, negative ones included, are never found.
pub async fn version_handler(
    State(scds): State<AppState>,
    Path((key, version)): Path<(String, String)>,
) -> ServerResult<Response> {
    let version: i64 = version
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("invalid version: {version}")))?;
    let Ok(version) = u64::try_from(version) else {
        scds_types::validate_key(&key).map_err(ScdsError::from)?;
        return Ok(found(None::<()>));
    };
    Ok(found(
        blocking(scds, move |s| s.get_at_version(&key, version)).await?,
    ))
}

pub async fn time_handler(
    State(scds): State<AppState>,
    Path((key, time)): Path<(String, String)>,
) -> ServerResult<Response> {
    Ok(found(
        blocking(scds, move |s| s.get_at_time_str(&key, &time)).await?,
    ))
}

pub async fn log_handler(
    State(scds): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Response> {
    Ok(found(blocking(scds, move |s| s.log(&key)).await?))
}

pub async fn verify_handler(
    State(scds): State<AppState>,
    Path(key): Path<String>,
) -> ServerResult<Json<ValidationReport>> {
    Ok(Json(blocking(scds, move |s| s.verify(&key)).await?))
}

/// Dry-run the schema set against a document.
pub async fn validate_handler(
    State(scds): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> ServerResult<Json<ValidationResult>> {
    scds_types::validate_key(&key).map_err(ScdsError::from)?;
    let value = parse_document(&body)?;
    Ok(Json(scds.validate(&key, &value)))
}
