use axum::extract::Extension;
use serde_json::{json, Value};

use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult};
use crate::scope::TenantScope;

/// GET /api/scope - The caller's resolved restaurant scope
pub async fn get(
    Extension(principal): Extension<Principal>,
    Extension(scope): Extension<TenantScope>,
) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "principal": principal,
        "scope": scope,
        "predicate": scope.predicate(),
    })))
}
