use thiserror::Error;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum ScopeError {
    /// The supplied restaurant hint is not in the caller's accessible set.
    #[error("Access to the requested restaurant is denied")]
    AccessDenied,

    /// The endpoint writes to a single restaurant but none was resolved.
    #[error("A restaurant context is required for this request")]
    TenantContextRequired,

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}
