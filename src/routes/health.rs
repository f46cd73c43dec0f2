use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::server::{AppState, API_VERSION};

/// Health check endpoint handler.
///
/// Returns a JSON response indicating the server is operational. Used by
/// load balancers and container orchestrators as a liveness probe.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
///
/// # Response Format
/// ```json
/// {
///   "status": "pong"
/// }
/// ```
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Greeting endpoint kept for smoke tests: `GET /hello`.
pub async fn hello() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

/// API and build version: `GET /versions`.
pub async fn versions() -> Json<Value> {
    Json(json!({
        "api": API_VERSION,
        "server": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

/// Readiness endpoint: `GET /health`.
///
/// Reports which store backend is active and, for PostgreSQL, whether the
/// database answers plus pool statistics.
///
/// # HTTP Status Codes
/// - **200 OK**: store is reachable
/// - **503 Service Unavailable**: database health check failed
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let Some(db) = state.db.as_ref() else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "memory" })),
        );
    };

    match db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": "postgres", "pool": db.stats() })),
        ),
        Err(e) => {
            tracing::error!("Database health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "store": "postgres" })),
            )
        }
    }
}
