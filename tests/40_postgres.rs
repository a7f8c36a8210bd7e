// Store tests against a live Postgres. Skipped when DATABASE_URL is unset.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use brigade_api::config::{AppConfig, Environment};
use brigade_api::database::models::{Container, ContainerKind, NewContainer, OrderedItem};
use brigade_api::database::{
    CollectionStore, DatabaseError, DatabaseManager, PgStore, TenantDirectory,
};
use brigade_api::ordering::{OrderError, OrderPlan, OrderUpdate, OrderedCollectionManager};
use brigade_api::scope::TenantPredicate;

async fn database() -> Result<Option<DatabaseManager>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return Ok(None);
    };

    let mut config = AppConfig::preset(Environment::Development).database;
    config.url = Some(url);
    config.max_connections = 16;

    let database = DatabaseManager::connect(&config).await?;
    database.migrate().await?;
    Ok(Some(database))
}

async fn add_tenant(database: &DatabaseManager, active: bool) -> Result<i64> {
    let slug = format!("t-{}", Uuid::new_v4().simple());
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO tenants (slug, name, active) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&slug)
    .bind(&slug)
    .bind(active)
    .fetch_one(database.pool())
    .await?;
    Ok(id)
}

async fn assign(
    database: &DatabaseManager,
    principal: Uuid,
    tenant_id: i64,
    role: &str,
    active: bool,
    age: Duration,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO staff_assignments (id, principal_id, tenant_id, role, active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(Uuid::new_v4())
    .bind(principal)
    .bind(tenant_id)
    .bind(role)
    .bind(active)
    .bind(Utc::now() - age)
    .execute(database.pool())
    .await?;
    Ok(())
}

async fn board(store: &PgStore, tenant_id: i64) -> Result<Container> {
    let container = store
        .create_container(NewContainer {
            tenant_id,
            owner_id: Uuid::new_v4(),
            kind: ContainerKind::Board,
            name: "Prep".to_string(),
        })
        .await?;
    Ok(container)
}

fn orders(items: &[OrderedItem]) -> Vec<i64> {
    items.iter().map(|i| i.order).collect()
}

#[tokio::test]
async fn failed_write_rolls_back_the_whole_plan() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = Arc::new(PgStore::new(&database));
    let manager = OrderedCollectionManager::new(store.clone(), 10);
    let tenant_id = add_tenant(&database, true).await?;
    let board = board(&store, tenant_id).await?;

    for name in ["a", "b", "c"] {
        manager.append(&board, json!({ "name": name })).await?;
    }
    let before = store.list_items(board.id).await?;

    // The delete and the first update succeed inside the transaction; the
    // update for an unknown row makes the batch come up one row short.
    let (first, second) = (before[0].id, before[1].id);
    let planner = move |_: &[OrderedItem]| -> Result<OrderPlan, OrderError> {
        Ok(OrderPlan {
            updates: vec![
                OrderUpdate {
                    item_id: second,
                    order: 50,
                },
                OrderUpdate {
                    item_id: Uuid::new_v4(),
                    order: 60,
                },
            ],
            insert: None,
            delete: Some(first),
        })
    };
    let result = store.mutate(board.id, &planner).await;
    assert!(matches!(
        result,
        Err(OrderError::Storage(DatabaseError::WriteFailed(_)))
    ));

    let after = store.list_items(board.id).await?;
    assert_eq!(after, before);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_get_distinct_orders() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = Arc::new(PgStore::new(&database));
    let manager = OrderedCollectionManager::new(store.clone(), 10);
    let tenant_id = add_tenant(&database, true).await?;
    let board = board(&store, tenant_id).await?;

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let manager = manager.clone();
            let board = board.clone();
            tokio::spawn(async move { manager.append(&board, json!({ "n": n })).await })
        })
        .collect();
    for task in tasks {
        task.await??;
    }

    let items = store.list_items(board.id).await?;
    assert_eq!(items.len(), 8);
    assert_eq!(orders(&items), (0..8).collect::<Vec<i64>>());
    Ok(())
}

#[tokio::test]
async fn bulk_reorder_applies_as_one_batch() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = Arc::new(PgStore::new(&database));
    let manager = OrderedCollectionManager::new(store.clone(), 10);
    let tenant_id = add_tenant(&database, true).await?;
    let board = board(&store, tenant_id).await?;

    for name in ["a", "b", "c", "d"] {
        manager.append(&board, json!({ "name": name })).await?;
    }
    let mut ids: Vec<Uuid> = store.list_items(board.id).await?.iter().map(|i| i.id).collect();
    ids.reverse();

    let items = manager.bulk_reorder(&board, &ids).await?;
    let reordered: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    assert_eq!(reordered, ids);
    assert_eq!(orders(&items), vec![0, 1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn assignments_collapse_and_skip_inactive_rows() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = PgStore::new(&database);
    let principal = Uuid::new_v4();

    let kitchen = add_tenant(&database, true).await?;
    let closed = add_tenant(&database, false).await?;
    let former = add_tenant(&database, true).await?;

    assign(&database, principal, kitchen, "chef", true, Duration::minutes(1)).await?;
    assign(&database, principal, kitchen, "manager", true, Duration::minutes(5)).await?;
    assign(&database, principal, closed, "manager", true, Duration::minutes(5)).await?;
    assign(&database, principal, former, "chef", false, Duration::minutes(5)).await?;

    let accessible = store.accessible_tenants(principal).await?;
    assert_eq!(accessible.len(), 1);
    assert_eq!(accessible[0].tenant_id, kitchen);
    assert_eq!(accessible[0].role, "manager");

    assert!(store.accessible_tenants(Uuid::new_v4()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn predicate_bounds_container_reads() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = PgStore::new(&database);
    let tenant_id = add_tenant(&database, true).await?;
    let other = add_tenant(&database, true).await?;
    let board = board(&store, tenant_id).await?;

    let nothing = TenantPredicate::Nothing;
    assert!(store.find_container(&nothing, ContainerKind::Board, board.id).await?.is_none());
    assert!(store.list_containers(&nothing, ContainerKind::Board).await?.is_empty());

    let foreign = TenantPredicate::Exact(other);
    assert!(store.find_container(&foreign, ContainerKind::Board, board.id).await?.is_none());

    let own = TenantPredicate::AnyOf(vec![other, tenant_id]);
    let found = store.find_container(&own, ContainerKind::Board, board.id).await?;
    assert_eq!(found.map(|c| c.id), Some(board.id));
    assert!(store.find_container(&own, ContainerKind::Menu, board.id).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn mutate_on_a_missing_container_is_not_found() -> Result<()> {
    let Some(database) = database().await? else {
        return Ok(());
    };
    let store = PgStore::new(&database);

    let planner = |_: &[OrderedItem]| -> Result<OrderPlan, OrderError> { Ok(OrderPlan::default()) };
    let result = store.mutate(Uuid::new_v4(), &planner).await;
    assert!(matches!(result, Err(OrderError::NotFound(_))));
    Ok(())
}
