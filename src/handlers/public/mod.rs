use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Brigade API",
            "version": version,
            "description": "Multi-restaurant scoping and ordered collections",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "scope": "/api/scope (protected)",
                "containers": "/api/:kind where kind is boards, pages or menus (protected)",
                "items": "/api/:kind/:container_id/items[/:item_id[/move]] (protected)",
                "order": "/api/:kind/:container_id/order (protected)",
                "restaurant": "/api/restaurants/:restaurant_id/* (protected, path hint)",
            }
        }
    }))
}

/// GET /health - Liveness plus storage connectivity
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();
    let backend = if state.database.is_some() { "postgres" } else { "memory" };

    match state.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "storage unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage": backend
                    }
                })),
            )
        }
    }
}
