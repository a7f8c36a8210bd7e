//! Tenant access resolution.
//!
//! Every authenticated request is bound to at most one restaurant out of the
//! set its principal may act on. The outcome is a [`TenantScope`] value that
//! travels with the request; storage reads and writes filter through the
//! [`TenantPredicate`] it derives.

pub mod error;
pub mod predicate;
pub mod resolver;

pub use error::ScopeError;
pub use predicate::TenantPredicate;
pub use resolver::{resolve_with, HintSource, RequestHints, TenantResolver, TenantScope};
