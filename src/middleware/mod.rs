pub mod auth;
pub mod response;
pub mod tenant_scope;

pub use auth::jwt_auth_middleware;
pub use response::{ApiResponse, ApiResult};
pub use tenant_scope::{request_hints, tenant_scope_middleware};
