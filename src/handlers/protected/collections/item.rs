use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::database::models::OrderedItem;
use crate::middleware::{ApiResponse, ApiResult};
use crate::ordering::Direction;
use crate::retry::with_storage_retry;
use crate::scope::TenantScope;
use crate::state::AppState;

use super::utils::{parse_kind, writable_container, ItemPath};

#[derive(Debug, Deserialize)]
pub struct MoveItem {
    pub direction: Direction,
}

/// POST /api/:kind/:container_id/items/:item_id/move - One step up or down
pub async fn move_step(
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<MoveItem>,
) -> ApiResult<Vec<OrderedItem>> {
    let kind = parse_kind(&path.kind)?;
    let container = writable_container(&state, &scope, kind, path.container_id).await?;

    let items = with_storage_retry(state.retry, || {
        state.collections.move_step(&container, path.item_id, body.direction)
    })
    .await?;

    Ok(ApiResponse::success(items))
}

/// DELETE /api/:kind/:container_id/items/:item_id - Remove one item, leaving a gap
pub async fn delete(
    State(state): State<AppState>,
    Path(path): Path<ItemPath>,
    Extension(scope): Extension<TenantScope>,
) -> ApiResult<()> {
    let kind = parse_kind(&path.kind)?;
    let container = writable_container(&state, &scope, kind, path.container_id).await?;

    with_storage_retry(state.retry, || state.collections.delete(&container, path.item_id)).await?;

    Ok(ApiResponse::no_content())
}
