use axum::{
    extract::{RawPathParams, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Principal;
use crate::config::TenancyConfig;
use crate::error::ApiError;
use crate::scope::RequestHints;
use crate::state::AppState;

/// Resolves the caller's `TenantScope` and injects it for the handlers.
///
/// Must run after `jwt_auth_middleware`. A hint naming a restaurant outside the
/// caller's assignments stops the request here with 403.
pub async fn tenant_scope_middleware(
    State(state): State<AppState>,
    path: Option<RawPathParams>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .copied()
        .ok_or_else(|| {
            ApiError::unauthorized("Authentication required before restaurant resolution")
        })?;

    let path_params: Vec<(&str, &str)> = path
        .as_ref()
        .map(|p| p.iter().collect())
        .unwrap_or_default();
    let hints = request_hints(
        request.headers(),
        request.uri().query(),
        &path_params,
        &state.config.tenancy,
    );

    let scope = state.resolver.resolve(&principal, &hints).await?;
    request.extensions_mut().insert(scope);

    Ok(next.run(request).await)
}

/// Lift the raw restaurant hints from header, query string and path parameters.
pub fn request_hints(
    headers: &HeaderMap,
    query: Option<&str>,
    path_params: &[(&str, &str)],
    tenancy: &TenancyConfig,
) -> RequestHints {
    // A present but non-ASCII header still counts as an explicit hint; it
    // must fail the membership check rather than fall through to query/path.
    let header = headers
        .get(tenancy.header_name.as_str())
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    let query = query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(key, _)| key == tenancy.query_param.as_str())
            .map(|(_, value)| value.into_owned())
    });

    let path = path_params
        .iter()
        .find(|(key, _)| *key == tenancy.path_param)
        .map(|(_, value)| value.to_string());

    RequestHints {
        header,
        query,
        path,
    }
}
