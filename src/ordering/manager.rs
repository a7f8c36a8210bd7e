use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{
    Container, ContainerKind, NewContainer, NewItem, OrderedItem, TenantId,
};
use crate::database::CollectionStore;
use crate::scope::TenantPredicate;

use super::error::OrderError;
use super::plan::{self, Direction, OrderPlan};

/// Position changes for every orderable resource. Containers are always looked
/// up through the caller's predicate before any item is touched.
#[derive(Clone)]
pub struct OrderedCollectionManager {
    store: Arc<dyn CollectionStore>,
    step: i64,
}

impl OrderedCollectionManager {
    pub fn new(store: Arc<dyn CollectionStore>, step: i64) -> Self {
        Self {
            store,
            step: step.max(2),
        }
    }

    pub async fn create_container(
        &self,
        tenant_id: TenantId,
        owner_id: Uuid,
        kind: ContainerKind,
        name: String,
    ) -> Result<Container, OrderError> {
        let container = self
            .store
            .create_container(NewContainer {
                tenant_id,
                owner_id,
                kind,
                name,
            })
            .await?;
        Ok(container)
    }

    pub async fn containers(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
    ) -> Result<Vec<Container>, OrderError> {
        Ok(self.store.list_containers(predicate, kind).await?)
    }

    /// The container, if it exists inside the predicate. Foreign containers are `NotFound`.
    pub async fn container(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
        container_id: Uuid,
    ) -> Result<Container, OrderError> {
        self.store
            .find_container(predicate, kind, container_id)
            .await?
            .ok_or_else(OrderError::container_not_found)
    }

    pub async fn items(&self, container: &Container) -> Result<Vec<OrderedItem>, OrderError> {
        Ok(self.store.list_items(container.id).await?)
    }

    pub async fn append(
        &self,
        container: &Container,
        payload: Value,
    ) -> Result<OrderedItem, OrderError> {
        let item = NewItem::new(payload);
        let item_id = item.id;
        let planner = move |current: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
            Ok(plan::plan_append(current, item.clone()))
        };
        let items = self.store.mutate(container.id, &planner).await?;
        created(items, item_id)
    }

    pub async fn insert_at(
        &self,
        container: &Container,
        payload: Value,
        position: usize,
    ) -> Result<OrderedItem, OrderError> {
        let item = NewItem::new(payload);
        let item_id = item.id;
        let step = self.step;
        let planner = move |current: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
            Ok(plan::plan_insert_at(current, item.clone(), position, step))
        };
        let items = self.store.mutate(container.id, &planner).await?;
        created(items, item_id)
    }

    pub async fn move_step(
        &self,
        container: &Container,
        item_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<OrderedItem>, OrderError> {
        let step = self.step;
        let planner = move |current: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
            plan::plan_move_step(current, item_id, direction, step)
        };
        self.store.mutate(container.id, &planner).await
    }

    pub async fn bulk_reorder(
        &self,
        container: &Container,
        ids: &[Uuid],
    ) -> Result<Vec<OrderedItem>, OrderError> {
        let ids = ids.to_vec();
        let planner = move |current: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
            plan::plan_bulk_reorder(current, &ids)
        };
        self.store.mutate(container.id, &planner).await
    }

    pub async fn delete(&self, container: &Container, item_id: Uuid) -> Result<(), OrderError> {
        let planner = move |current: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
            plan::plan_delete(current, item_id)
        };
        self.store.mutate(container.id, &planner).await?;
        Ok(())
    }
}

fn created(items: Vec<OrderedItem>, item_id: Uuid) -> Result<OrderedItem, OrderError> {
    items
        .into_iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| OrderError::item_not_found(item_id))
}
