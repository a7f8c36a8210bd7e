pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod ordering;
pub mod retry;
pub mod scope;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{jwt_auth_middleware, tenant_scope_middleware};
use crate::state::AppState;

/// Build the full router: public routes plus the protected API mounted both
/// at `/api` and at `/api/restaurants/:restaurant_id`.
pub fn app(state: AppState) -> Router {
    let api = api_routes(state.clone());
    let restaurant_prefix = format!("/api/restaurants/:{}", state.config.tenancy.path_param);

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .nest("/api", api.clone())
        .nest(&restaurant_prefix, api)
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(&state.config.security) {
        router = router.layer(cors);
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    use protected::collections as c;

    Router::new()
        .route("/scope", get(protected::scope::get))
        .route("/:kind", get(c::container_list).post(c::container_create))
        .route("/:kind/:container_id/items", get(c::items_get).post(c::items_post))
        .route("/:kind/:container_id/items/:item_id", axum::routing::delete(c::item_delete))
        .route("/:kind/:container_id/items/:item_id/move", post(c::item_move))
        .route("/:kind/:container_id/order", put(c::order_put))
        // Authenticate, then resolve the restaurant
        .route_layer(
            ServiceBuilder::new()
                .layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
                .layer(from_fn_with_state(state, tenant_scope_middleware)),
        )
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any))
}
