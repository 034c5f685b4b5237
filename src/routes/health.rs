use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub users: i64,
}

/// Liveness check.
#[tracing::instrument(name = "health.check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let users = match state.services.users.count().await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "User count unavailable");
            -1
        }
    };
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        users,
    })
}
