use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use dealwatch_catalog::CatalogError;
use dealwatch_core::StoreError;
use dealwatch_notifications::NotificationError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFoundCategory(name) => json_error(
            StatusCode::NOT_FOUND,
            "not_found_category",
            format!("category not found: {name}"),
        ),
        CatalogError::NotFoundCategoryFilter(token) => json_error(
            StatusCode::NOT_FOUND,
            "not_found_category_filter",
            format!("unknown category filter: {token}"),
        ),
        CatalogError::NotFoundProduct => {
            json_error(StatusCode::NOT_FOUND, "not_found_product", "product not found")
        }
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn notification_error_to_response(err: NotificationError) -> axum::response::Response {
    match err {
        NotificationError::NotFoundProduct => {
            json_error(StatusCode::NOT_FOUND, "not_found_product", "product not found")
        }
        NotificationError::Store(e) => store_error_to_response(e),
    }
}

/// Store details are logged, never returned.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    error!(error = %err, "store failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "store_error",
        "internal storage error",
    )
}

pub fn unauthenticated() -> axum::response::Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "unauthenticated",
        "a valid bearer token is required",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
