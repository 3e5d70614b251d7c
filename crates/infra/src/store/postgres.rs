//! Postgres-backed stores.
//!
//! Tables (see `sql/schema.sql`): `product`, `category`, `product_category`
//! and `notification`. Every method issues exactly one statement. Live-database
//! coverage is in `tests/postgres_stores.rs`.
//!
//! ## Error Mapping
//!
//! | SQLx Error        | StoreError    |
//! |-------------------|---------------|
//! | Database          | `Database`    |
//! | PoolClosed        | `Unavailable` |
//! | PoolTimedOut      | `Unavailable` |
//! | Io / Tls          | `Unavailable` |
//! | ColumnDecode etc. | `Decode`      |
//! | Other             | `Database`    |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{info, instrument};

use dealwatch_catalog::{
    CatalogStore, Category, Condition, MarketplaceIds, Predicate, Product, ProductQuery,
    SortDirection, SortField, SortSpec,
};
use dealwatch_core::{CategoryId, ProductId, StoreError, StoreResult, UserId};
use dealwatch_notifications::{Subscription, SubscriptionStore};

const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id,
        p.marketplace_product_id,
        p.marketplace_item_id,
        p.marketplace_vendor_item_id,
        p.name,
        p.image_url,
        p.is_out_of_stock,
        p.original_price,
        p.price,
        p.discount_rate,
        p.card_discount,
        p.url,
        p.affiliate_url,
        p.created_at,
        p.updated_at,
        COALESCE(
            json_agg(json_build_object('id', c.id, 'name', c.name) ORDER BY c.id)
                FILTER (WHERE c.id IS NOT NULL),
            '[]'
        ) AS categories
    FROM product p
    LEFT JOIN product_category pc ON pc.product_id = p.id
    LEFT JOIN category c ON c.id = pc.category_id
"#;

// The no-op update makes a conflicting insert wait for the winner and return
// its committed row, so concurrent callers all get the first `created_at`.
const UPSERT_SUBSCRIPTION: &str = r#"
    INSERT INTO notification (user_id, product_id, created_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id, product_id) DO UPDATE SET user_id = EXCLUDED.user_id
    RETURNING user_id, product_id, created_at
"#;

/// Open the shared connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    info!(max_connections, "connected to postgres");
    Ok(pool)
}

/// Postgres-backed catalog reads.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self), err)]
    async fn count_categories(&self, name: &str) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category WHERE name = $1")
            .bind(name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count_categories", e))?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self), err)]
    async fn find_products(&self, query: &ProductQuery) -> StoreResult<Vec<Product>> {
        let mut builder = build_product_query(query);
        let rows = builder
            .build()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_products", e))?;

        rows.iter()
            .map(|row| product_from_row(row).map_err(|e| map_sqlx_error("find_products", e)))
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn find_product(&self, id: ProductId) -> StoreResult<Option<Product>> {
        let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
        builder.push(" WHERE p.id = ");
        builder.push_bind(id.get());
        builder.push(" GROUP BY p.id");

        let row = builder
            .build()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_product", e))?;

        row.as_ref()
            .map(product_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_product", e))
    }
}

/// Fold a [`ProductQuery`] into a parameterized SELECT.
pub(crate) fn build_product_query(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(PRODUCT_SELECT);
    push_where(&mut builder, &query.condition, query.cursor);
    builder.push(" GROUP BY p.id");
    push_order_by(&mut builder, query.sort);
    if let Some(take) = query.take {
        builder.push(" LIMIT ");
        builder.push_bind(i64::from(take));
    }
    builder
}

fn push_where(
    builder: &mut QueryBuilder<'static, Postgres>,
    condition: &Condition,
    cursor: Option<ProductId>,
) {
    builder.push(" WHERE TRUE");
    for clause in condition.clauses() {
        builder.push(" AND (");
        push_predicate(builder, clause);
        builder.push(")");
    }
    if let Some(cursor) = cursor {
        builder.push(" AND p.id > ");
        builder.push_bind(cursor.get());
    }
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::InCategory(name) => {
            builder.push(
                "EXISTS (SELECT 1 FROM product_category pc2 \
                 JOIN category c2 ON c2.id = pc2.category_id \
                 WHERE pc2.product_id = p.id AND c2.name = ",
            );
            builder.push_bind(name.clone());
            builder.push(")");
        }
        Predicate::InAnyCategory(ids) => {
            let ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();
            builder.push(
                "EXISTS (SELECT 1 FROM product_category pc2 \
                 WHERE pc2.product_id = p.id AND pc2.category_id = ANY(",
            );
            builder.push_bind(ids);
            builder.push("))");
        }
        Predicate::StockStatus { out_of_stock } => {
            builder.push("p.is_out_of_stock = ");
            builder.push_bind(*out_of_stock);
        }
        Predicate::DiscountNotNull => {
            builder.push("p.discount_rate IS NOT NULL");
        }
        Predicate::DiscountNotZero => {
            builder.push("p.discount_rate <> 0");
        }
        Predicate::Excludes(id) => {
            builder.push("p.id <> ");
            builder.push_bind(id.get());
        }
    }
}

fn push_order_by(builder: &mut QueryBuilder<'static, Postgres>, sort: Option<SortSpec>) {
    builder.push(" ORDER BY ");
    if let Some(sort) = sort {
        let column = match sort.field {
            SortField::DiscountRate => "p.discount_rate",
            SortField::Price => "p.price",
        };
        let direction = match sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        builder.push(format!("{column} {direction} NULLS LAST, "));
    }
    builder.push("p.id ASC");
}

#[derive(Debug, Deserialize)]
struct CategoryJson {
    id: i64,
    name: String,
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    let Json(categories): Json<Vec<CategoryJson>> = row.try_get("categories")?;
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        marketplace: MarketplaceIds {
            product_id: row.try_get("marketplace_product_id")?,
            item_id: row.try_get("marketplace_item_id")?,
            vendor_item_id: row.try_get("marketplace_vendor_item_id")?,
        },
        name: row.try_get("name")?,
        image_url: row.try_get("image_url")?,
        is_out_of_stock: row.try_get("is_out_of_stock")?,
        original_price: row.try_get("original_price")?,
        price: row.try_get("price")?,
        discount_rate: row.try_get("discount_rate")?,
        card_discount: row.try_get("card_discount")?,
        url: row.try_get("url")?,
        affiliate_url: row.try_get("affiliate_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        categories: categories
            .into_iter()
            .map(|c| Category {
                id: CategoryId::new(c.id),
                name: c.name,
            })
            .collect(),
    })
}

/// Postgres-backed subscriptions (`notification` table).
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionStore {
    pool: Arc<PgPool>,
}

impl PostgresSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }
}

#[async_trait]
impl SubscriptionStore for PostgresSubscriptionStore {
    #[instrument(skip(self), err)]
    async fn find(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<Option<Subscription>> {
        let row = sqlx::query(
            r#"
            SELECT user_id, product_id, created_at
            FROM notification
            WHERE user_id = $1 AND product_id = $2
            "#,
        )
        .bind(user_id.get())
        .bind(product_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_subscription", e))?;

        row.as_ref()
            .map(subscription_from_row)
            .transpose()
            .map_err(|e| map_sqlx_error("find_subscription", e))
    }

    #[instrument(skip(self), err)]
    async fn insert_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription> {
        let row = sqlx::query(UPSERT_SUBSCRIPTION)
        .bind(subscription.user_id.get())
        .bind(subscription.product_id.get())
        .bind(subscription.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_subscription", e))?;

        subscription_from_row(&row).map_err(|e| map_sqlx_error("insert_subscription", e))
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, user_id: UserId, product_id: ProductId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notification WHERE user_id = $1 AND product_id = $2")
            .bind(user_id.get())
            .bind(product_id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_subscription", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, product_id, created_at
            FROM notification
            WHERE user_id = $1
            ORDER BY created_at DESC, product_id ASC
            "#,
        )
        .bind(user_id.get())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_subscriptions", e))?;

        rows.iter()
            .map(|row| {
                subscription_from_row(row).map_err(|e| map_sqlx_error("list_subscriptions", e))
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn subscribed_among(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> StoreResult<Vec<ProductId>> {
        let ids: Vec<i64> = product_ids.iter().map(|id| id.get()).collect();
        let found: Vec<i64> = sqlx::query_scalar(
            "SELECT product_id FROM notification WHERE user_id = $1 AND product_id = ANY($2)",
        )
        .bind(user_id.get())
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("subscribed_among", e))?;
        Ok(found.into_iter().map(ProductId::new).collect())
    }
}

fn subscription_from_row(row: &PgRow) -> Result<Subscription, sqlx::Error> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Subscription::new(
        UserId::new(row.try_get("user_id")?),
        ProductId::new(row.try_get("product_id")?),
        created_at,
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::database(operation, db_err.message()),
        sqlx::Error::PoolClosed => StoreError::unavailable(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => {
            StoreError::unavailable(operation, "timed out acquiring a connection")
        }
        sqlx::Error::Io(e) => StoreError::unavailable(operation, e.to_string()),
        sqlx::Error::Tls(e) => StoreError::unavailable(operation, e.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::decode(operation, err.to_string()),
        other => StoreError::database(operation, other.to_string()),
    }
}
