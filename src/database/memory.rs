use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    AccessibleTenant, Container, ContainerKind, NewContainer, OrderedItem, StaffAssignment, Tenant,
    TenantId,
};
use crate::database::store::{CollectionStore, Planner, TenantDirectory};
use crate::ordering::plan::sort_items;
use crate::ordering::OrderError;
use crate::scope::TenantPredicate;

#[derive(Default)]
struct MemoryState {
    tenants: HashMap<TenantId, Tenant>,
    assignments: Vec<StaffAssignment>,
    containers: HashMap<Uuid, Container>,
    items: HashMap<Uuid, OrderedItem>,
    next_tenant_id: TenantId,
}

impl MemoryState {
    fn sorted_items(&self, container_id: Uuid) -> Vec<OrderedItem> {
        let mut items: Vec<OrderedItem> = self
            .items
            .values()
            .filter(|i| i.container_id == container_id && i.active)
            .cloned()
            .collect();
        sort_items(&mut items);
        items
    }
}

/// Process-local store used in development mode and tests.
///
/// `mutate` holds the write lock for the whole operation and applies the plan
/// to a staged copy, swapping it in only after every write succeeded.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    fail_on_write: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`th write of the next mutation fail. `0` disarms.
    pub fn fail_on_write(&self, n: usize) {
        self.fail_on_write.store(n, Ordering::SeqCst);
    }

    pub async fn add_tenant(&self, slug: &str, name: &str) -> Tenant {
        let mut state = self.state.write().await;
        state.next_tenant_id += 1;
        let tenant = Tenant {
            id: state.next_tenant_id,
            slug: slug.to_string(),
            name: name.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        state.tenants.insert(tenant.id, tenant.clone());
        tenant
    }

    pub async fn set_tenant_active(&self, tenant_id: TenantId, active: bool) {
        if let Some(tenant) = self.state.write().await.tenants.get_mut(&tenant_id) {
            tenant.active = active;
        }
    }

    pub async fn assign(
        &self,
        principal_id: Uuid,
        tenant_id: TenantId,
        role: &str,
    ) -> StaffAssignment {
        let assignment = StaffAssignment {
            id: Uuid::new_v4(),
            principal_id,
            tenant_id,
            role: role.to_string(),
            active: true,
            created_at: Utc::now(),
        };
        self.state.write().await.assignments.push(assignment.clone());
        assignment
    }

    pub async fn deactivate_assignment(&self, assignment_id: Uuid) {
        let mut state = self.state.write().await;
        if let Some(a) = state.assignments.iter_mut().find(|a| a.id == assignment_id) {
            a.active = false;
        }
    }

    /// Insert an item with an explicit order, bypassing the manager.
    pub async fn seed_item(&self, container_id: Uuid, order: i64, payload: Value) -> OrderedItem {
        let item = OrderedItem {
            id: Uuid::new_v4(),
            container_id,
            order,
            active: true,
            payload,
            created_at: Utc::now(),
        };
        self.state.write().await.items.insert(item.id, item.clone());
        item
    }
}

#[async_trait]
impl TenantDirectory for MemoryStore {
    async fn accessible_tenants(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<AccessibleTenant>, DatabaseError> {
        let state = self.state.read().await;
        let mut out: Vec<AccessibleTenant> = Vec::new();

        let assignments = state
            .assignments
            .iter()
            .filter(|a| a.principal_id == principal_id && a.active);

        for assignment in assignments {
            let Some(tenant) = state.tenants.get(&assignment.tenant_id).filter(|t| t.active) else {
                continue;
            };
            // Duplicate active assignments to one tenant are redundant; first one wins.
            if out.iter().any(|t| t.tenant_id == tenant.id) {
                continue;
            }
            out.push(AccessibleTenant {
                tenant_id: tenant.id,
                slug: tenant.slug.clone(),
                role: assignment.role.clone(),
            });
        }

        out.sort_by_key(|t| t.tenant_id);
        Ok(out)
    }
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn create_container(&self, new: NewContainer) -> Result<Container, DatabaseError> {
        let mut state = self.state.write().await;
        if !state.tenants.contains_key(&new.tenant_id) {
            return Err(DatabaseError::QueryError(format!("unknown tenant {}", new.tenant_id)));
        }
        let container = Container {
            id: Uuid::new_v4(),
            tenant_id: new.tenant_id,
            owner_id: new.owner_id,
            kind: new.kind,
            name: new.name,
            created_at: Utc::now(),
        };
        state.containers.insert(container.id, container.clone());
        Ok(container)
    }

    async fn find_container(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
        container_id: Uuid,
    ) -> Result<Option<Container>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .containers
            .get(&container_id)
            .filter(|c| c.kind == kind && predicate.matches(c.tenant_id))
            .cloned())
    }

    async fn list_containers(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
    ) -> Result<Vec<Container>, DatabaseError> {
        let state = self.state.read().await;
        let mut containers: Vec<Container> = state
            .containers
            .values()
            .filter(|c| c.kind == kind && predicate.matches(c.tenant_id))
            .cloned()
            .collect();
        containers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(containers)
    }

    async fn list_items(&self, container_id: Uuid) -> Result<Vec<OrderedItem>, DatabaseError> {
        Ok(self.state.read().await.sorted_items(container_id))
    }

    async fn mutate(
        &self,
        container_id: Uuid,
        planner: &Planner,
    ) -> Result<Vec<OrderedItem>, OrderError> {
        let mut state = self.state.write().await;
        if !state.containers.contains_key(&container_id) {
            return Err(OrderError::container_not_found());
        }

        let items = state.sorted_items(container_id);
        let plan = planner(items.as_slice())?;
        if plan.is_noop() {
            return Ok(items);
        }

        let fail_at = self.fail_on_write.swap(0, Ordering::SeqCst);
        let mut writes = 0usize;
        let mut write = || -> Result<(), DatabaseError> {
            writes += 1;
            if writes == fail_at {
                return Err(DatabaseError::WriteFailed(format!(
                    "injected fault at write {}",
                    writes
                )));
            }
            Ok(())
        };

        let mut staged = state.items.clone();

        if let Some(item_id) = plan.delete {
            write()?;
            staged.remove(&item_id);
        }

        for update in &plan.updates {
            write()?;
            match staged.get_mut(&update.item_id) {
                Some(item) if item.container_id == container_id => item.order = update.order,
                _ => {
                    let message = format!("item {} vanished", update.item_id);
                    return Err(DatabaseError::WriteFailed(message).into());
                }
            }
        }

        if let Some((item, order)) = &plan.insert {
            write()?;
            staged.insert(
                item.id,
                OrderedItem {
                    id: item.id,
                    container_id,
                    order: *order,
                    active: true,
                    payload: item.payload.clone(),
                    created_at: Utc::now(),
                },
            );
        }

        state.items = staged;
        Ok(state.sorted_items(container_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inactive_tenants_and_assignments_are_invisible() {
        let store = MemoryStore::new();
        let principal = Uuid::new_v4();
        let a = store.add_tenant("bistro", "Bistro").await;
        let b = store.add_tenant("diner", "Diner").await;
        let c = store.add_tenant("cafe", "Cafe").await;

        store.assign(principal, a.id, "manager").await;
        let removed = store.assign(principal, b.id, "chef").await;
        store.assign(principal, c.id, "chef").await;
        store.deactivate_assignment(removed.id).await;
        store.set_tenant_active(c.id, false).await;

        let accessible = store.accessible_tenants(principal).await.unwrap();
        assert_eq!(accessible.len(), 1);
        assert_eq!(accessible[0].tenant_id, a.id);
        assert_eq!(accessible[0].slug, "bistro");
    }

    #[tokio::test]
    async fn duplicate_assignments_collapse() {
        let store = MemoryStore::new();
        let principal = Uuid::new_v4();
        let t = store.add_tenant("bistro", "Bistro").await;
        store.assign(principal, t.id, "manager").await;
        store.assign(principal, t.id, "chef").await;

        let accessible = store.accessible_tenants(principal).await.unwrap();
        assert_eq!(accessible.len(), 1);
        assert_eq!(accessible[0].role, "manager");
    }

    #[tokio::test]
    async fn containers_are_filtered_by_predicate() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let mine = store.add_tenant("mine", "Mine").await;
        let theirs = store.add_tenant("theirs", "Theirs").await;

        let board = store
            .create_container(NewContainer {
                tenant_id: theirs.id,
                owner_id: owner,
                kind: ContainerKind::Board,
                name: "Line".into(),
            })
            .await
            .unwrap();

        let scoped = TenantPredicate::Exact(mine.id);
        assert!(store
            .find_container(&scoped, ContainerKind::Board, board.id)
            .await
            .unwrap()
            .is_none());
        assert!(store.list_containers(&scoped, ContainerKind::Board).await.unwrap().is_empty());
        assert!(store
            .list_containers(&TenantPredicate::Nothing, ContainerKind::Board)
            .await
            .unwrap()
            .is_empty());

        let theirs_scope = TenantPredicate::Exact(theirs.id);
        assert!(store
            .find_container(&theirs_scope, ContainerKind::Page, board.id)
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_container(&theirs_scope, ContainerKind::Board, board.id)
            .await
            .unwrap()
            .is_some());
    }
}
