use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::OrderedItem;
use crate::middleware::{ApiResponse, ApiResult};
use crate::retry::with_storage_retry;
use crate::scope::TenantScope;
use crate::state::AppState;

use super::utils::{parse_kind, writable_container, ContainerPath};

#[derive(Debug, Deserialize)]
pub struct ReorderItems {
    /// Every active item id of the container, in the desired order.
    pub ids: Vec<Uuid>,
}

/// PUT /api/:kind/:container_id/order - Replace the whole order, returns the refreshed list
pub async fn put(
    State(state): State<AppState>,
    Path(path): Path<ContainerPath>,
    Extension(scope): Extension<TenantScope>,
    Json(body): Json<ReorderItems>,
) -> ApiResult<Vec<OrderedItem>> {
    let kind = parse_kind(&path.kind)?;
    let container = writable_container(&state, &scope, kind, path.container_id).await?;

    let items = with_storage_retry(state.retry, || {
        state.collections.bulk_reorder(&container, &body.ids)
    })
    .await?;

    Ok(ApiResponse::success(items))
}
