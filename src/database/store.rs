use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessibleTenant, Container, ContainerKind, NewContainer, OrderedItem,
};
use crate::ordering::{OrderError, OrderPlan};
use crate::scope::TenantPredicate;

/// Read-only view of staff assignments.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Active assignments of `principal_id` whose restaurant is also active.
    async fn accessible_tenants(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<AccessibleTenant>, DatabaseError>;
}

/// Computes the writes for one operation from the container's current, sorted items.
pub type Planner = dyn Fn(&[OrderedItem]) -> Result<OrderPlan, OrderError> + Send + Sync;

/// Containers and their ordered items. Every container read takes the caller's predicate.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn create_container(&self, new: NewContainer) -> Result<Container, DatabaseError>;

    async fn find_container(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
        container_id: Uuid,
    ) -> Result<Option<Container>, DatabaseError>;

    async fn list_containers(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
    ) -> Result<Vec<Container>, DatabaseError>;

    /// Active items sorted by `(order, id)`.
    async fn list_items(&self, container_id: Uuid) -> Result<Vec<OrderedItem>, DatabaseError>;

    /// Run `planner` against a locked snapshot of the container and apply its
    /// plan in one transaction. Returns the refreshed, sorted items. Nothing is
    /// written when the planner or any write fails.
    async fn mutate(
        &self,
        container_id: Uuid,
        planner: &Planner,
    ) -> Result<Vec<OrderedItem>, OrderError>;
}
