use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseError, DatabaseManager, MemoryStore, PgStore};
use crate::ordering::OrderedCollectionManager;
use crate::retry::RetryPolicy;
use crate::scope::TenantResolver;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub resolver: TenantResolver,
    pub collections: OrderedCollectionManager,
    pub retry: RetryPolicy,
    /// Present when backed by Postgres; the in-memory store has no pool.
    pub database: Option<DatabaseManager>,
}

impl AppState {
    /// Connect to the configured database, or fall back to the in-memory store
    /// when no URL is set.
    pub async fn from_config(config: AppConfig) -> Result<Self, DatabaseError> {
        match config.database.url.as_deref() {
            Some(_) => {
                let database = DatabaseManager::connect(&config.database).await?;
                if config.database.run_migrations {
                    database.migrate().await?;
                }
                Ok(Self::postgres(config, database))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                Ok(Self::memory(config, Arc::new(MemoryStore::new())))
            }
        }
    }

    pub fn postgres(config: AppConfig, database: DatabaseManager) -> Self {
        let store = Arc::new(PgStore::new(&database));
        Self {
            resolver: TenantResolver::new(store.clone()),
            collections: OrderedCollectionManager::new(store, config.ordering.step()),
            retry: RetryPolicy::from(&config.ordering),
            config: Arc::new(config),
            database: Some(database),
        }
    }

    pub fn memory(config: AppConfig, store: Arc<MemoryStore>) -> Self {
        Self {
            resolver: TenantResolver::new(store.clone()),
            collections: OrderedCollectionManager::new(store, config.ordering.step()),
            retry: RetryPolicy::from(&config.ordering),
            config: Arc::new(config),
            database: None,
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.database {
            Some(database) => database.health_check().await,
            None => Ok(()),
        }
    }
}
