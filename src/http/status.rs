//! Service health endpoint.
//!
//! Reports the version, the active store backend and the number of stored
//! recipes. A failing store turns the check into a 500.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::response::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub recipes: usize,
}

/// GET /health
pub async fn get_health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    let recipes = state
        .store
        .count()
        .await
        .map_err(|e| ApiError::store("count", e))?;

    Ok(Json(HealthStatus {
        status: "operational".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend().to_string(),
        recipes,
    }))
}
