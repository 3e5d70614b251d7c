//! In-memory stores for tests/dev.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;

use dealwatch_catalog::{
    CatalogStore, Category, Condition, Predicate, Product, ProductQuery, SortDirection, SortField,
    SortSpec,
};
use dealwatch_core::{CategoryId, ProductId, StoreError, StoreResult, UserId};
use dealwatch_notifications::{Subscription, SubscriptionStore};

/// In-memory catalog. Products carry their categories inline.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    categories: RwLock<BTreeMap<CategoryId, Category>>,
    products: RwLock<BTreeMap<ProductId, Product>>,
    product_queries: AtomicUsize,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_category(&self, category: Category) {
        let mut map = self.categories.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(category.id, category);
    }

    /// Insert or replace a product, registering its categories too.
    pub fn insert_product(&self, product: Product) {
        for category in &product.categories {
            self.insert_category(category.clone());
        }
        let mut map = self.products.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(product.id, product);
    }

    /// Number of product lookups served so far (`find_products` + `find_product`).
    pub fn product_queries(&self) -> usize {
        self.product_queries.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count_categories(&self, name: &str) -> StoreResult<u64> {
        let map = self
            .categories
            .read()
            .map_err(|_| StoreError::unavailable("count_categories", "lock poisoned"))?;
        Ok(map.values().filter(|c| c.name == name).count() as u64)
    }

    async fn find_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        self.product_queries.fetch_add(1, AtomicOrdering::SeqCst);
        let map = self
            .products
            .read()
            .map_err(|_| StoreError::unavailable("find_products", "lock poisoned"))?;

        // BTreeMap iteration is id-ascending, which is the default order.
        let mut rows: Vec<Product> = map
            .values()
            .filter(|p| query.cursor.is_none_or(|cursor| p.id > cursor))
            .filter(|p| matches_condition(&query.condition, p))
            .cloned()
            .collect();

        if let Some(sort) = query.sort {
            rows.sort_by(|a, b| compare(sort, a, b).then(a.id.cmp(&b.id)));
        }
        if let Some(take) = query.take {
            rows.truncate(take as usize);
        }
        Ok(rows)
    }

    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        self.product_queries.fetch_add(1, AtomicOrdering::SeqCst);
        let map = self
            .products
            .read()
            .map_err(|_| StoreError::unavailable("find_product", "lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }
}

fn matches_condition(condition: &Condition, product: &Product) -> bool {
    condition.clauses().iter().all(|clause| matches_predicate(clause, product))
}

fn matches_predicate(predicate: &Predicate, product: &Product) -> bool {
    match predicate {
        Predicate::InCategory(name) => product.is_in_category(name),
        Predicate::InAnyCategory(ids) => product.categories.iter().any(|c| ids.contains(&c.id)),
        Predicate::StockStatus { out_of_stock } => product.is_out_of_stock == *out_of_stock,
        Predicate::DiscountNotNull => product.discount_rate.is_some(),
        // SQL semantics: NULL <> 0 is not true.
        Predicate::DiscountNotZero => product.discount_rate.is_some_and(|rate| rate != 0),
        Predicate::Excludes(id) => product.id != *id,
    }
}

/// Null discount rates sort last in both directions, as `NULLS LAST` does.
fn compare(sort: SortSpec, a: &Product, b: &Product) -> Ordering {
    let ord = match sort.field {
        SortField::Price => a.price.cmp(&b.price),
        SortField::DiscountRate => match (a.discount_rate, b.discount_rate) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    };
    match sort.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// In-memory subscription store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionStore {
    inner: RwLock<BTreeMap<(UserId, ProductId), Subscription>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<Option<Subscription>> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::unavailable("find_subscription", "lock poisoned"))?;
        Ok(map.get(&(user_id, product_id)).cloned())
    }

    async fn insert_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::unavailable("insert_subscription", "lock poisoned"))?;
        Ok(map.entry(subscription.key()).or_insert(subscription).clone())
    }

    async fn delete(&self, user_id: UserId, product_id: ProductId) -> StoreResult<bool> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::unavailable("delete_subscription", "lock poisoned"))?;
        Ok(map.remove(&(user_id, product_id)).is_some())
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Subscription>> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::unavailable("list_subscriptions", "lock poisoned"))?;
        let mut subs: Vec<Subscription> = map
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        subs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.product_id.cmp(&b.product_id)));
        Ok(subs)
    }

    async fn subscribed_among(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> StoreResult<Vec<ProductId>> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::unavailable("subscribed_among", "lock poisoned"))?;
        Ok(product_ids
            .iter()
            .copied()
            .filter(|id| map.contains_key(&(user_id, *id)))
            .collect())
    }
}
