use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::database::DatabaseError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid reorder: {0}")]
    InvalidReorder(ReorderMismatch),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl OrderError {
    pub fn container_not_found() -> Self {
        OrderError::NotFound("Container not found".to_string())
    }

    pub fn item_not_found(item_id: Uuid) -> Self {
        OrderError::NotFound(format!("Item {} not found in container", item_id))
    }

    /// Only storage faults are worth re-running; everything else is a request problem.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Storage(e) if e.is_retryable())
    }
}

/// Difference between a submitted id sequence and the container's current items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorderMismatch {
    pub missing: Vec<Uuid>,
    pub unexpected: Vec<Uuid>,
    pub duplicated: Vec<Uuid>,
}

impl ReorderMismatch {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.duplicated.is_empty()
    }
}

impl fmt::Display for ReorderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("{} missing", self.missing.len()));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("{} unexpected", self.unexpected.len()));
        }
        if !self.duplicated.is_empty() {
            parts.push(format!("{} duplicated", self.duplicated.len()));
        }
        if parts.is_empty() {
            return f.write_str("id list matches container");
        }
        write!(f, "id list does not match container ({})", parts.join(", "))
    }
}
