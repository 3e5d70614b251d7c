use axum::Router;

pub mod notifications;
pub mod products;
pub mod system;

/// Router for every endpoint behind the optional-auth layer.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/notifications", notifications::router())
}
