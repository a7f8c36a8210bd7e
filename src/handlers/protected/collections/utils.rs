use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Container, ContainerKind};
use crate::error::ApiError;
use crate::scope::TenantScope;
use crate::state::AppState;

/// Path parameters are read into structs so the same handlers serve both the
/// `/api` and `/api/restaurants/:restaurant_id` mounts.
#[derive(Debug, Deserialize)]
pub struct KindPath {
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct ContainerPath {
    pub kind: String,
    pub container_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ItemPath {
    pub kind: String,
    pub container_id: Uuid,
    pub item_id: Uuid,
}

/// Map the plural route segment to a container kind; anything else is 404.
pub fn parse_kind(segment: &str) -> Result<ContainerKind, ApiError> {
    ContainerKind::from_segment(segment)
        .ok_or_else(|| ApiError::not_found(format!("Unknown collection '{}'", segment)))
}

/// Load a container through the caller's scope. Containers outside it are 404.
pub async fn scoped_container(
    state: &AppState,
    scope: &TenantScope,
    kind: ContainerKind,
    container_id: Uuid,
) -> Result<Container, ApiError> {
    let container = state.collections.container(&scope.predicate(), kind, container_id).await?;
    Ok(container)
}

/// Writes must name one restaurant; the container must also belong to it.
pub async fn writable_container(
    state: &AppState,
    scope: &TenantScope,
    kind: ContainerKind,
    container_id: Uuid,
) -> Result<Container, ApiError> {
    scope.require_tenant()?;
    scoped_container(state, scope, kind, container_id).await
}
