//! HTTP gateway (Axum) for batch submission and result streaming.
//!
//! This module is primarily used by the `labelcheck` server binary.

pub mod error;
pub mod export;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handler::{batch_snapshot_handler, export_csv_handler, verify_batch_handler};
pub use payload::BatchVerifyRequest;
pub use state::HandlerState;

use crate::extraction::FieldExtractor;
use crate::intake::ImageStore;

pub const LABELCHECK_STATUS_HEADER: &str = "X-Labelcheck-Status";
pub const LABELCHECK_STATUS_HEALTHY: &str = "healthy";
pub const LABELCHECK_STATUS_READY: &str = "ready";
pub const LABELCHECK_STATUS_ERROR: &str = "error";

pub fn create_router_with_state<E, S>(state: HandlerState<E, S>) -> Router
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/verify/batch", post(verify_batch_handler))
        .route("/v1/verify/batch/{batch_id}", get(batch_snapshot_handler))
        .route(
            "/v1/verify/batch/{batch_id}/export.csv",
            get(export_csv_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub uploads: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        LABELCHECK_STATUS_HEADER,
        HeaderValue::from_static(LABELCHECK_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<E, S>(State(state): State<HandlerState<E, S>>) -> Response
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    let uploads_status = if state.upload_dir.exists() && state.upload_dir.is_dir() {
        LABELCHECK_STATUS_READY
    } else {
        LABELCHECK_STATUS_ERROR
    };

    let components = ComponentStatus {
        http: LABELCHECK_STATUS_READY,
        uploads: uploads_status,
    };

    let is_ready = components.uploads == LABELCHECK_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(
        LABELCHECK_STATUS_HEADER,
        HeaderValue::from_str(status_msg).unwrap_or(HeaderValue::from_static("error")),
    );

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
