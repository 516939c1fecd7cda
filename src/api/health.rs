use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::infrastructure::AppState;

/// Liveness probe; degrades to 503 when the database stops answering.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (status, status_label, database) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "up"),
        Err(e) => {
            tracing::error!("Health check: database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "down")
        }
    };

    (
        status,
        Json(json!({
            "status": status_label,
            "service": "bibliocatalog",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}
