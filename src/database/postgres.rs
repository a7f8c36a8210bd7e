use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    AccessibleTenant, Container, ContainerKind, NewContainer, OrderedItem,
};
use crate::database::store::{CollectionStore, Planner, TenantDirectory};
use crate::ordering::{OrderError, OrderPlan};
use crate::scope::TenantPredicate;

const ITEM_COLUMNS: &str = "id, container_id, sort_order, active, payload, created_at";
const CONTAINER_COLUMNS: &str = "id, tenant_id, owner_id, kind, name, created_at";

/// sqlx-backed directory and collection store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ContainerRow {
    id: Uuid,
    tenant_id: i64,
    owner_id: Uuid,
    kind: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ContainerRow> for Container {
    type Error = DatabaseError;

    fn try_from(row: ContainerRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<ContainerKind>().map_err(DatabaseError::QueryError)?;
        Ok(Container {
            id: row.id,
            tenant_id: row.tenant_id,
            owner_id: row.owner_id,
            kind,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

impl PgStore {
    pub fn new(database: &DatabaseManager) -> Self {
        Self {
            pool: database.pool().clone(),
        }
    }

    async fn lock_container(
        tx: &mut Transaction<'_, Postgres>,
        container_id: Uuid,
    ) -> Result<(), OrderError> {
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM containers WHERE id = $1 FOR UPDATE")
                .bind(container_id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(DatabaseError::from)?;

        match locked {
            Some(_) => Ok(()),
            None => Err(OrderError::container_not_found()),
        }
    }

    async fn items_in(
        tx: &mut Transaction<'_, Postgres>,
        container_id: Uuid,
    ) -> Result<Vec<OrderedItem>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ordered_items \
             WHERE container_id = $1 AND active ORDER BY sort_order, id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderedItem>(&sql)
            .bind(container_id)
            .fetch_all(&mut **tx)
            .await?;
        Ok(items)
    }

    async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        container_id: Uuid,
        plan: &OrderPlan,
    ) -> Result<(), DatabaseError> {
        if let Some(item_id) = plan.delete {
            sqlx::query("DELETE FROM ordered_items WHERE id = $1 AND container_id = $2")
                .bind(item_id)
                .bind(container_id)
                .execute(&mut **tx)
                .await?;
        }

        if !plan.updates.is_empty() {
            let ids: Vec<Uuid> = plan.updates.iter().map(|u| u.item_id).collect();
            let orders: Vec<i64> = plan.updates.iter().map(|u| u.order).collect();
            let result = sqlx::query(
                "UPDATE ordered_items AS i SET sort_order = u.sort_order \
                 FROM UNNEST($1::uuid[], $2::bigint[]) AS u(id, sort_order) \
                 WHERE i.id = u.id AND i.container_id = $3",
            )
            .bind(&ids)
            .bind(&orders)
            .bind(container_id)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() != plan.updates.len() as u64 {
                return Err(DatabaseError::WriteFailed(format!(
                    "expected {} order updates, applied {}",
                    plan.updates.len(),
                    result.rows_affected()
                )));
            }
        }

        if let Some((item, order)) = &plan.insert {
            sqlx::query(
                "INSERT INTO ordered_items (id, container_id, sort_order, active, payload) \
                 VALUES ($1, $2, $3, TRUE, $4)",
            )
            .bind(item.id)
            .bind(container_id)
            .bind(order)
            .bind(&item.payload)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for PgStore {
    async fn accessible_tenants(
        &self,
        principal_id: Uuid,
    ) -> Result<Vec<AccessibleTenant>, DatabaseError> {
        let rows = sqlx::query_as::<_, AccessibleTenant>(
            r#"
            SELECT DISTINCT ON (t.id) t.id AS tenant_id, t.slug, a.role
            FROM staff_assignments a
            JOIN tenants t ON t.id = a.tenant_id
            WHERE a.principal_id = $1
            AND a.active = true
            AND t.active = true
            ORDER BY t.id, a.created_at
            "#,
        )
        .bind(principal_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl CollectionStore for PgStore {
    async fn create_container(&self, new: NewContainer) -> Result<Container, DatabaseError> {
        let sql = format!(
            "INSERT INTO containers (id, tenant_id, owner_id, kind, name) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            CONTAINER_COLUMNS
        );
        let row = sqlx::query_as::<_, ContainerRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.tenant_id)
            .bind(new.owner_id)
            .bind(new.kind.as_str())
            .bind(&new.name)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_container(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
        container_id: Uuid,
    ) -> Result<Option<Container>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM containers WHERE id = $1 AND kind = $2 AND tenant_id = ANY($3)",
            CONTAINER_COLUMNS
        );
        let row = sqlx::query_as::<_, ContainerRow>(&sql)
            .bind(container_id)
            .bind(kind.as_str())
            .bind(predicate.tenant_ids())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Container::try_from).transpose()
    }

    async fn list_containers(
        &self,
        predicate: &TenantPredicate,
        kind: ContainerKind,
    ) -> Result<Vec<Container>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM containers \
             WHERE kind = $1 AND tenant_id = ANY($2) ORDER BY created_at, id",
            CONTAINER_COLUMNS
        );
        let rows = sqlx::query_as::<_, ContainerRow>(&sql)
            .bind(kind.as_str())
            .bind(predicate.tenant_ids())
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Container::try_from).collect()
    }

    async fn list_items(&self, container_id: Uuid) -> Result<Vec<OrderedItem>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ordered_items \
             WHERE container_id = $1 AND active ORDER BY sort_order, id",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, OrderedItem>(&sql)
            .bind(container_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn mutate(
        &self,
        container_id: Uuid,
        planner: &Planner,
    ) -> Result<Vec<OrderedItem>, OrderError> {
        // Dropping `tx` without commit (error or cancelled request) rolls everything back.
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        Self::lock_container(&mut tx, container_id).await?;
        let items = Self::items_in(&mut tx, container_id).await?;

        let plan = planner(items.as_slice())?;
        if plan.is_noop() {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Ok(items);
        }

        Self::apply(&mut tx, container_id, &plan).await?;
        let refreshed = Self::items_in(&mut tx, container_id).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        tracing::debug!(
            "Committed {} order writes for container {}",
            plan.write_count(),
            container_id
        );
        Ok(refreshed)
    }
}
