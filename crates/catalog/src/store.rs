use std::sync::Arc;

use async_trait::async_trait;

use dealwatch_core::{ProductId, StoreResult};

use crate::condition::Condition;
use crate::filter::SortSpec;
use crate::product::Product;

/// Declarative product lookup handed to a [`CatalogStore`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    pub condition: Condition,
    /// Authoritative ordering. Stores break ties by ascending id.
    pub sort: Option<SortSpec>,
    /// Only ids strictly greater than this one.
    pub cursor: Option<ProductId>,
    pub take: Option<u32>,
}

impl ProductQuery {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            ..Default::default()
        }
    }

    pub fn sorted(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn after(mut self, cursor: Option<ProductId>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn take(mut self, take: u32) -> Self {
        self.take = Some(take);
        self
    }
}

/// Read access to the catalog tables.
///
/// Every call is a single independent query; implementations own pooling.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Number of categories with exactly this name (0 or 1).
    async fn count_categories(&self, name: &str) -> StoreResult<u64>;

    /// Products matching the query, categories joined.
    async fn find_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>>;

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn count_categories(&self, name: &str) -> StoreResult<u64> {
        (**self).count_categories(name).await
    }

    async fn find_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        (**self).find_products(query).await
    }

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        (**self).find_product(id).await
    }
}
