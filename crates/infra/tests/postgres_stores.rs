//! Postgres store tests.
//!
//! Tests: Service → PostgresCatalogStore / PostgresSubscriptionStore → live database
//!
//! Runs only when `DATABASE_URL` points at a reachable Postgres; each test
//! works in its own schema loaded from `sql/schema.sql` and drops it at the end.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use dealwatch_catalog::{CatalogError, CatalogQueryService, CatalogStore, StockVisibility};
use dealwatch_core::{ProductId, UserId};
use dealwatch_infra::store::{PostgresCatalogStore, PostgresSubscriptionStore};
use dealwatch_notifications::{NotificationService, Subscription, SubscriptionStore};

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

struct TestDb {
    pool: PgPool,
    schema: String,
}

impl TestDb {
    /// `None` when `DATABASE_URL` is unset.
    async fn create(name: &str) -> Option<Self> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping {name}");
            return None;
        };
        let schema = format!(
            "dealwatch_test_{name}_{}",
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        let admin = PgPool::connect(&url).await.expect("connect");
        sqlx::query(&format!("CREATE SCHEMA {schema}"))
            .execute(&admin)
            .await
            .expect("create schema");
        admin.close().await;

        let options = PgConnectOptions::from_str(&url)
            .expect("parse DATABASE_URL")
            .options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new()
            .max_connections(16)
            .connect_with(options)
            .await
            .expect("connect with schema");
        sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await.expect("load schema");

        Some(Self { pool, schema })
    }

    async fn teardown(self) {
        sqlx::query(&format!("DROP SCHEMA {} CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .expect("drop schema");
        self.pool.close().await;
    }

    async fn category(&self, id: i64, name: &str) {
        sqlx::query("INSERT INTO category (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .expect("insert category");
    }

    async fn product(
        &self,
        id: i64,
        categories: &[i64],
        discount_rate: Option<i32>,
        out_of_stock: bool,
        price: i64,
    ) {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        sqlx::query(
            "INSERT INTO product (id, marketplace_product_id, name, image_url, is_out_of_stock, \
             original_price, price, discount_rate, url, affiliate_url, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)",
        )
        .bind(id)
        .bind(format!("mp-{id}"))
        .bind(format!("Product {id}"))
        .bind(format!("https://img.example/{id}.jpg"))
        .bind(out_of_stock)
        .bind(price * 2)
        .bind(price)
        .bind(discount_rate)
        .bind(format!("https://shop.example/p/{id}"))
        .bind(format!("https://link.example/a/{id}"))
        .bind(at)
        .execute(&self.pool)
        .await
        .expect("insert product");

        for category_id in categories {
            sqlx::query("INSERT INTO product_category (product_id, category_id) VALUES ($1, $2)")
                .bind(id)
                .bind(category_id)
                .execute(&self.pool)
                .await
                .expect("insert product_category");
        }
    }

    /// shoes: 1 (10%), 2 (null), 3 (40%, out of stock), 5 (25%);
    /// hats: 4 (0%), 5.
    async fn seed(&self) {
        self.category(1, "shoes").await;
        self.category(3, "hats").await;
        self.product(1, &[1], Some(10), false, 100).await;
        self.product(2, &[1], None, false, 100).await;
        self.product(3, &[1], Some(40), true, 50).await;
        self.product(4, &[3], Some(0), false, 100).await;
        self.product(5, &[1, 3], Some(25), false, 300).await;
    }
}

fn ids(products: &[dealwatch_catalog::Product]) -> Vec<i64> {
    products.iter().map(|p| p.id.get()).collect()
}

#[tokio::test]
async fn catalog_listings_against_postgres() {
    let Some(db) = TestDb::create("catalog").await else {
        return;
    };
    db.seed().await;
    let service = CatalogQueryService::new(PostgresCatalogStore::new(db.pool.clone()));

    let shown = service
        .list_by_category("shoes", None, None, StockVisibility::ShowAll)
        .await
        .unwrap();
    assert_eq!(ids(&shown), vec![1, 3, 5]);

    let in_stock = service
        .list_by_category("shoes", None, None, StockVisibility::HideOutOfStock)
        .await
        .unwrap();
    assert_eq!(ids(&in_stock), vec![1, 5]);

    assert!(matches!(
        service
            .list_by_category("bags", None, None, StockVisibility::ShowAll)
            .await,
        Err(CatalogError::NotFoundCategory(_))
    ));

    let top = service.list_top(None).await.unwrap();
    assert_eq!(ids(&top), vec![5, 1]);

    assert!(matches!(
        service
            .list_by_category_filtered("shoes", "price_bogus", None, None, StockVisibility::ShowAll)
            .await,
        Err(CatalogError::NotFoundCategoryFilter(_))
    ));

    let by_discount = service
        .list_by_category_filtered(
            "shoes",
            "discountRate_desc",
            None,
            None,
            StockVisibility::ShowAll,
        )
        .await
        .unwrap();
    assert_eq!(ids(&by_discount), vec![3, 5, 1]);

    let after_one = service
        .list_by_category_filtered(
            "shoes",
            "price_desc",
            Some(ProductId::new(1)),
            None,
            StockVisibility::ShowAll,
        )
        .await
        .unwrap();
    assert_eq!(ids(&after_one), vec![5, 3]);

    db.teardown().await;
}

#[tokio::test]
async fn detail_and_similar_against_postgres() {
    let Some(db) = TestDb::create("detail").await else {
        return;
    };
    db.seed().await;
    let service = CatalogQueryService::new(PostgresCatalogStore::new(db.pool.clone()));

    assert!(matches!(
        service.get_detail(ProductId::new(999), None).await,
        Err(CatalogError::NotFoundProduct)
    ));

    let detail = service.get_detail(ProductId::new(5), None).await.unwrap();
    let names: Vec<&str> = detail.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["shoes", "hats"]);
    assert_eq!(detail.discount_rate, Some(25));

    let null_discount = service.get_detail(ProductId::new(2), None).await.unwrap();
    assert_eq!(null_discount.discount_rate, None);

    let similar = service.get_similar(ProductId::new(1), None).await.unwrap();
    assert_eq!(ids(&similar), vec![5]);

    let similar = service.get_similar(ProductId::new(4), None).await.unwrap();
    assert_eq!(ids(&similar), vec![5]);

    db.teardown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_subscribes_return_one_stored_row() {
    let Some(db) = TestDb::create("subscribe").await else {
        return;
    };
    db.seed().await;
    let store = Arc::new(PostgresSubscriptionStore::new(db.pool.clone()));
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    for user in 1..=25 {
        let user_id = UserId::new(user);
        let mut tasks = Vec::new();
        for attempt in 0..8 {
            let store = store.clone();
            let created_at = base + Duration::seconds(attempt);
            let sub = Subscription::new(user_id, ProductId::new(1), created_at);
            tasks.push(tokio::spawn(async move { store.insert_if_absent(sub).await }));
        }

        let mut stored = Vec::new();
        for task in tasks {
            stored.push(task.await.unwrap().unwrap());
        }
        assert!(stored.windows(2).all(|w| w[0] == w[1]), "user {user}: {stored:?}");
        assert_eq!(store.find(user_id, ProductId::new(1)).await.unwrap().as_ref(), stored.first());
    }

    db.teardown().await;
}

#[tokio::test]
async fn subscription_lifecycle_against_postgres() {
    let Some(db) = TestDb::create("lifecycle").await else {
        return;
    };
    db.seed().await;
    let catalog = PostgresCatalogStore::new(db.pool.clone());
    let subscriptions = PostgresSubscriptionStore::new(db.pool.clone());
    let service = NotificationService::new(subscriptions.clone(), catalog.clone());
    let user = UserId::new(9);

    let first = service.subscribe(user, ProductId::new(1)).await.unwrap();
    let again = service.subscribe(user, ProductId::new(1)).await.unwrap();
    assert_eq!(first, again);
    service.subscribe(user, ProductId::new(5)).await.unwrap();

    assert!(matches!(
        service.subscribe(user, ProductId::new(999)).await,
        Err(dealwatch_notifications::NotificationError::NotFoundProduct)
    ));

    let enabled = subscriptions
        .subscribed_among(user, &[ProductId::new(1), ProductId::new(2), ProductId::new(5)])
        .await
        .unwrap();
    assert_eq!(enabled.len(), 2);
    assert_eq!(service.list_for_user(user).await.unwrap().len(), 2);

    assert!(service.unsubscribe(user, ProductId::new(1)).await.unwrap());
    assert!(!service.unsubscribe(user, ProductId::new(1)).await.unwrap());
    assert!(!service.exists(user, ProductId::new(1)).await.unwrap());

    // The catalog store stays usable after the subscription writes.
    assert!(catalog.find_product(ProductId::new(1)).await.unwrap().is_some());

    db.teardown().await;
}
