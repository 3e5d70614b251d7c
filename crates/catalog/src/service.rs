//! Catalog query orchestration.
//!
//! Each operation validates its inputs against the store, composes a
//! [`ProductQuery`], runs it, and turns an empty scoped result into a
//! domain-level not-found. Calls are sequential; nothing is fanned out.

use thiserror::Error;
use tracing::{debug, instrument};

use dealwatch_core::{ProductId, StoreError, UserId};

use crate::condition::{self, Condition, StockVisibility};
use crate::filter::{self, InvalidFilterError, SortDirection, SortField, SortSpec};
use crate::product::Product;
use crate::store::{CatalogStore, ProductQuery};

/// Cap on the top-discount listing.
pub const TOP_DISCOUNT_LIMIT: u32 = 10;

/// Cap on the similar-products listing.
pub const SIMILAR_LIMIT: u32 = 10;

const BY_DISCOUNT_DESC: SortSpec = SortSpec::new(SortField::DiscountRate, SortDirection::Desc);

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("category not found: {0}")]
    NotFoundCategory(String),

    #[error("unknown category filter: {0}")]
    NotFoundCategoryFilter(String),

    #[error("product not found")]
    NotFoundProduct,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<InvalidFilterError> for CatalogError {
    fn from(err: InvalidFilterError) -> Self {
        Self::NotFoundCategoryFilter(err.token)
    }
}

/// Read-only catalog operations over an injected store.
#[derive(Debug, Clone)]
pub struct CatalogQueryService<S> {
    store: S,
}

impl<S> CatalogQueryService<S>
where
    S: CatalogStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every product, optionally hiding out-of-stock rows. Empty is a valid answer.
    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        user_id: Option<UserId>,
        stock: StockVisibility,
    ) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::new(Condition::new().with_stock_visibility(stock));
        let products = self.store.find_products(&query).await?;
        debug!(count = products.len(), "listed all products");
        Ok(products)
    }

    /// The ten deepest in-stock discounts.
    #[instrument(skip(self))]
    pub async fn list_top(&self, user_id: Option<UserId>) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::new(condition::top_discount_condition())
            .sorted(Some(BY_DISCOUNT_DESC))
            .take(TOP_DISCOUNT_LIMIT);
        non_empty(self.store.find_products(&query).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_by_category(
        &self,
        category_name: &str,
        user_id: Option<UserId>,
        cursor: Option<ProductId>,
        stock: StockVisibility,
    ) -> Result<Vec<Product>, CatalogError> {
        self.ensure_category(category_name).await?;
        self.list_category_scoped(category_name, None, cursor, stock).await
    }

    /// Category listing ordered by a client filter token.
    ///
    /// The category is checked before the token, so an unknown category wins
    /// over an unknown token.
    #[instrument(skip(self))]
    pub async fn list_by_category_filtered(
        &self,
        category_name: &str,
        filter_token: &str,
        cursor: Option<ProductId>,
        user_id: Option<UserId>,
        stock: StockVisibility,
    ) -> Result<Vec<Product>, CatalogError> {
        self.ensure_category(category_name).await?;
        let sort = filter::resolve_sort(filter_token)?;
        self.list_category_scoped(category_name, Some(sort), cursor, stock).await
    }

    #[instrument(skip(self))]
    pub async fn get_detail(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
    ) -> Result<Product, CatalogError> {
        self.store
            .find_product(product_id)
            .await?
            .ok_or(CatalogError::NotFoundProduct)
    }

    /// Discounted, in-stock products sharing a category with `product_id`,
    /// deepest discount first. An empty list is a valid answer.
    #[instrument(skip(self))]
    pub async fn get_similar(
        &self,
        product_id: ProductId,
        user_id: Option<UserId>,
    ) -> Result<Vec<Product>, CatalogError> {
        let source = self
            .store
            .find_product(product_id)
            .await?
            .ok_or(CatalogError::NotFoundProduct)?;

        let categories = source.category_ids();
        if categories.is_empty() {
            debug!("source product has no categories");
            return Ok(Vec::new());
        }

        let query = ProductQuery::new(condition::similar_condition(source.id, categories))
            .sorted(Some(BY_DISCOUNT_DESC))
            .take(SIMILAR_LIMIT);
        Ok(self.store.find_products(&query).await?)
    }

    async fn ensure_category(&self, name: &str) -> Result<(), CatalogError> {
        if self.store.count_categories(name).await? == 0 {
            debug!(category = name, "category does not exist");
            return Err(CatalogError::NotFoundCategory(name.to_string()));
        }
        Ok(())
    }

    async fn list_category_scoped(
        &self,
        category_name: &str,
        sort: Option<SortSpec>,
        cursor: Option<ProductId>,
        stock: StockVisibility,
    ) -> Result<Vec<Product>, CatalogError> {
        let query = ProductQuery::new(condition::build_condition(category_name, stock))
            .sorted(sort)
            .after(cursor);
        non_empty(self.store.find_products(&query).await?)
    }
}

fn non_empty(products: Vec<Product>) -> Result<Vec<Product>, CatalogError> {
    if products.is_empty() {
        Err(CatalogError::NotFoundProduct)
    } else {
        Ok(products)
    }
}
