use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::tenant::TenantId;

/// Binds a principal to a restaurant. Removal deactivates the row instead of deleting it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StaffAssignment {
    pub id: Uuid,
    pub principal_id: Uuid,
    pub tenant_id: TenantId,
    pub role: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}
