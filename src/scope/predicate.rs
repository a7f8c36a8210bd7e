use serde::Serialize;

use crate::database::models::TenantId;

/// Row filter derived from a [`super::TenantScope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "tenant_ids", rename_all = "snake_case")]
pub enum TenantPredicate {
    /// A single resolved restaurant.
    Exact(TenantId),
    /// Read across every accessible restaurant; no single one was resolved.
    AnyOf(Vec<TenantId>),
    /// No access at all. Matches no row, never an unfiltered scan.
    Nothing,
}

impl TenantPredicate {
    pub fn matches(&self, tenant_id: TenantId) -> bool {
        match self {
            TenantPredicate::Exact(id) => *id == tenant_id,
            TenantPredicate::AnyOf(ids) => ids.contains(&tenant_id),
            TenantPredicate::Nothing => false,
        }
    }

    /// Ids for a `tenant_id = ANY($n)` bind. Empty for `Nothing`, which matches no row.
    pub fn tenant_ids(&self) -> Vec<TenantId> {
        match self {
            TenantPredicate::Exact(id) => vec![*id],
            TenantPredicate::AnyOf(ids) => ids.clone(),
            TenantPredicate::Nothing => Vec::new(),
        }
    }
}
