// handlers/protected/mod.rs - Protected handlers
//
// Every route here runs behind jwt_auth_middleware then tenant_scope_middleware,
// so handlers can rely on `Extension<Principal>` and `Extension<TenantScope>`.
pub mod collections; // Containers and their ordered items
pub mod scope;       // Resolved restaurant scope for the caller
