use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::Utc;
use community_relief::auth::{auth_router, AuthGate, AuthService, UserStore};
use community_relief::coordination::{
    coordination_router, CoordinationService, DirectoryStore, EventPublisher,
};
use community_relief::events::{events_router, EventHub};
use serde_json::json;
use std::sync::Arc;

const SERVICE_NAME: &str = "Community Resource Dashboard API";

/// Every API surface plus the operational endpoints and the JSON 404 fallback.
pub(crate) fn application<S, P, U>(
    coordination: Arc<CoordinationService<S, P>>,
    auth: Arc<AuthService<U>>,
    hub: EventHub,
) -> Router
where
    S: DirectoryStore + 'static,
    P: EventPublisher + 'static,
    U: UserStore + 'static,
{
    let gate = AuthGate::new(auth.clone());

    coordination_router(coordination, gate)
        .merge(auth_router(auth))
        .merge(events_router(hub))
        .route("/", get(welcome))
        .route("/api/health", get(api_health))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .fallback(not_found)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn api_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": format!("{SERVICE_NAME} is running"),
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn welcome() -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Welcome to the {SERVICE_NAME}"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": "/api/auth",
            "categories": "/api/categories",
            "resources": "/api/resources",
            "emergency_requests": "/api/emergency-requests",
            "volunteers": "/api/volunteers",
            "events": "/api/events",
        },
    }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": "The requested resource was not found",
        })),
    )
}
