use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
};

use dealwatch_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new().route("/", get(list_subscriptions)).route(
        "/:product_id",
        get(subscription_status).post(subscribe).delete(unsubscribe),
    )
}

fn require_user(user: UserContext) -> Result<UserId, axum::response::Response> {
    user.user_id().ok_or_else(errors::unauthenticated)
}

pub async fn list_subscriptions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let user_id = match require_user(user) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.notifications.list_for_user(user_id).await {
        Ok(subs) => {
            let items: Vec<dto::SubscriptionResponse> =
                subs.iter().map(dto::SubscriptionResponse::from).collect();
            Json(dto::Items::new(items)).into_response()
        }
        Err(e) => errors::notification_error_to_response(e),
    }
}

pub async fn subscription_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let user_id = match require_user(user) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let product_id = match dto::parse_product_id(&product_id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.notifications.exists(user_id, product_id).await {
        Ok(subscribed) => Json(dto::SubscriptionStatus {
            product_id,
            subscribed,
        })
        .into_response(),
        Err(e) => errors::notification_error_to_response(e),
    }
}

pub async fn subscribe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let user_id = match require_user(user) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let product_id = match dto::parse_product_id(&product_id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.notifications.subscribe(user_id, product_id).await {
        Ok(sub) => Json(dto::SubscriptionResponse::from(&sub)).into_response(),
        Err(e) => errors::notification_error_to_response(e),
    }
}

pub async fn unsubscribe(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let user_id = match require_user(user) {
        Ok(v) => v,
        Err(res) => return res,
    };
    let product_id = match dto::parse_product_id(&product_id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.notifications.unsubscribe(user_id, product_id).await {
        Ok(removed) => Json(dto::UnsubscribeResponse {
            product_id,
            removed,
        })
        .into_response(),
        Err(e) => errors::notification_error_to_response(e),
    }
}
