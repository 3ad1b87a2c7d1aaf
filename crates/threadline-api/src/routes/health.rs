use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its dependencies
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HealthResponse>> {
    let mut services = HashMap::new();

    match state.actions.store().ping().await {
        Ok(_) => services.insert("store".to_string(), "connected".to_string()),
        Err(e) => {
            tracing::warn!("Store ping failed: {}", e);
            services.insert("store".to_string(), "disconnected".to_string())
        }
    };

    let cache = if state.cache.is_enabled() {
        format!("{} entries", state.cache.len().await)
    } else {
        "disabled".to_string()
    };
    services.insert("cache".to_string(), cache);

    let status = if services.get("store").map(String::as_str) == Some("connected") {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
