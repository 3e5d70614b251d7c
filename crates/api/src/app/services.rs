use std::sync::Arc;

use tracing::warn;

use dealwatch_catalog::{CatalogQueryService, CatalogStore};
use dealwatch_core::StoreResult;
use dealwatch_infra::config::AppConfig;
use dealwatch_infra::store::{
    InMemoryCatalogStore, InMemorySubscriptionStore, PostgresCatalogStore,
    PostgresSubscriptionStore, connect,
};
use dealwatch_notifications::{NotificationService, SubscriptionStore};

pub type DynCatalogStore = Arc<dyn CatalogStore>;
pub type DynSubscriptionStore = Arc<dyn SubscriptionStore>;

/// Services shared by every handler.
pub struct AppServices {
    pub catalog: CatalogQueryService<DynCatalogStore>,
    pub notifications: NotificationService<DynSubscriptionStore, DynCatalogStore>,
}

impl AppServices {
    pub fn new(catalog: DynCatalogStore, subscriptions: DynSubscriptionStore) -> Self {
        Self {
            catalog: CatalogQueryService::new(catalog.clone()),
            notifications: NotificationService::new(subscriptions, catalog),
        }
    }

    /// In-memory wiring over a caller-seeded catalog.
    pub fn in_memory(catalog: Arc<InMemoryCatalogStore>) -> Self {
        Self::new(catalog, Arc::new(InMemorySubscriptionStore::new()))
    }
}

/// Pick the backend from configuration: Postgres when `DATABASE_URL` is set,
/// otherwise an empty in-memory catalog.
pub async fn build_services(config: &AppConfig) -> StoreResult<AppServices> {
    match config.database_url.as_deref() {
        Some(url) => {
            let pool = connect(url, config.max_connections).await?;
            Ok(AppServices::new(
                Arc::new(PostgresCatalogStore::new(pool.clone())),
                Arc::new(PostgresSubscriptionStore::new(pool)),
            ))
        }
        None => {
            warn!("DATABASE_URL not set; serving an empty in-memory catalog");
            Ok(AppServices::in_memory(Arc::new(InMemoryCatalogStore::new())))
        }
    }
}
