use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A positionable child of a container. `order` is ascending display sequence; gaps are normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderedItem {
    pub id: Uuid,
    pub container_id: Uuid,
    #[sqlx(rename = "sort_order")]
    pub order: i64,
    pub active: bool,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// An item waiting to be placed; the manager decides its `order`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub id: Uuid,
    pub payload: Value,
}

impl NewItem {
    pub fn new(payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
        }
    }
}
