use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::OrderedItem;
use crate::middleware::{ApiResponse, ApiResult};
use crate::retry::with_storage_retry;
use crate::scope::TenantScope;
use crate::state::AppState;

use super::utils::{parse_kind, scoped_container, writable_container, ContainerPath};

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    /// Zero-based slot; absent appends at the end.
    pub position: Option<usize>,
    #[serde(default)]
    pub payload: Value,
}

/// GET /api/:kind/:container_id/items - Items in display order
pub async fn get(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Extension(scope): Extension<TenantScope>,
) -> ApiResult<Vec<OrderedItem>> {
    let kind = parse_kind(&path.kind)?;
    let container = scoped_container(&state, &scope, kind, path.container_id).await?;
    let items = state.collections.items(&container).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/:kind/:container_id/items - Append, or insert at `position`
pub async fn post(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<CreateItem>,
) -> ApiResult<OrderedItem> {
    let kind = parse_kind(&path.kind)?;
    let container = writable_container(&state, &scope, kind, path.container_id).await?;

    let item = with_storage_retry(state.retry, || {
        let position = body.position;
        let payload = body.payload.clone();
        let collections = &state.collections;
        let container = &container;
        async move {
            match position {
                Some(position) => collections.insert_at(container, payload, position).await,
                None => collections.append(container, payload).await,
            }
        }
    })
    .await?;

    Ok(ApiResponse::created(item))
}
