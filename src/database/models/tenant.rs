use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Restaurants are keyed by a database-assigned integer.
pub type TenantId = i64;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the typed directory read: an active assignment joined to its active tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AccessibleTenant {
    pub tenant_id: TenantId,
    pub slug: String,
    pub role: String,
}
