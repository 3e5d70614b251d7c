use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    response::IntoResponse,
    routing::get,
};

use dealwatch_catalog::{Product, ProductDetail, ProductSummary};
use dealwatch_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/top", get(list_top))
        .route("/category/:name", get(list_by_category))
        .route("/category/:name/:filter", get(list_by_category_filtered))
        .route("/:id", get(get_product))
        .route("/:id/similar", get(list_similar))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<dto::StockQuery>,
) -> axum::response::Response {
    match services
        .catalog
        .list_all(user.user_id(), query.stock_visibility())
        .await
    {
        Ok(products) => summaries(&services, user, products).await,
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_top(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match services.catalog.list_top(user.user_id()).await {
        Ok(products) => summaries(&services, user, products).await,
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(name): Path<String>,
    Query(query): Query<dto::CategoryQuery>,
) -> axum::response::Response {
    let result = services
        .catalog
        .list_by_category(&name, user.user_id(), query.cursor(), query.stock_visibility())
        .await;

    match result {
        Ok(products) => summaries(&services, user, products).await,
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_by_category_filtered(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path((name, filter)): Path<(String, String)>,
    Query(query): Query<dto::CategoryQuery>,
) -> axum::response::Response {
    let result = services
        .catalog
        .list_by_category_filtered(
            &name,
            &filter,
            query.cursor(),
            user.user_id(),
            query.stock_visibility(),
        )
        .await;

    match result {
        Ok(products) => summaries(&services, user, products).await,
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    let product = match services.catalog.get_detail(product_id, user.user_id()).await {
        Ok(p) => p,
        Err(e) => return errors::catalog_error_to_response(e),
    };

    let enabled = match notification_flags(&services, user, &[product.id]).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    Json(ProductDetail::project(&product, flag_for(enabled.as_ref(), product.id))).into_response()
}

pub async fn list_similar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.catalog.get_similar(product_id, user.user_id()).await {
        Ok(products) => summaries(&services, user, products).await,
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Project a page of products, joining the caller's alert flags in one lookup.
async fn summaries(
    services: &AppServices,
    user: UserContext,
    products: Vec<Product>,
) -> axum::response::Response {
    let ids: Vec<ProductId> = products.iter().map(|p| p.id).collect();
    let enabled = match notification_flags(services, user, &ids).await {
        Ok(v) => v,
        Err(res) => return res,
    };

    let items: Vec<ProductSummary> = products
        .iter()
        .map(|p| ProductSummary::project(p, flag_for(enabled.as_ref(), p.id)))
        .collect();
    Json(dto::Items::new(items)).into_response()
}

async fn notification_flags(
    services: &AppServices,
    user: UserContext,
    ids: &[ProductId],
) -> Result<Option<HashSet<ProductId>>, axum::response::Response> {
    services
        .notifications
        .enabled_among(user.user_id(), ids)
        .await
        .map_err(errors::notification_error_to_response)
}

fn flag_for(enabled: Option<&HashSet<ProductId>>, id: ProductId) -> Option<bool> {
    enabled.map(|set| set.contains(&id))
}
