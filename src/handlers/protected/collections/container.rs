use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::auth::Principal;
use crate::database::models::Container;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::TenantScope;
use crate::state::AppState;

use super::utils::{parse_kind, KindPath};

#[derive(Debug, Deserialize)]
pub struct CreateContainer {
    pub name: String,
}

/// GET /api/:kind - Containers of one kind across the caller's scope
pub async fn get(
    State(state): State<AppState>,
    Path(path): Path<KindPath>,
    Extension(scope): Extension<TenantScope>,
) -> ApiResult<Vec<Container>> {
    let kind = parse_kind(&path.kind)?;
    let containers = state.collections.containers(&scope.predicate(), kind).await?;
    Ok(ApiResponse::success(containers))
}

/// POST /api/:kind - Create a container in the resolved restaurant
pub async fn post(
    State(state): State<AppState>,
    Path(path): Path<KindPath>,
    Extension(principal): Extension<Principal>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<CreateContainer>,
) -> ApiResult<Container> {
    let kind = parse_kind(&path.kind)?;
    let tenant_id = scope.require_tenant()?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Container name must not be empty"));
    }

    let container = state
        .collections
        .create_container(tenant_id, principal.id, kind, name.to_string())
        .await?;

    tracing::info!(tenant_id, kind = %kind, container_id = %container.id, "container created");
    Ok(ApiResponse::created(container))
}
