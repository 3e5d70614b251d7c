use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealwatch_catalog::StockVisibility;
use dealwatch_core::ProductId;
use dealwatch_notifications::Subscription;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct StockQuery {
    #[serde(rename = "includeOutOfStock")]
    pub include_out_of_stock: Option<String>,
}

impl StockQuery {
    pub fn stock_visibility(&self) -> StockVisibility {
        StockVisibility::from_query_flag(self.include_out_of_stock.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub cursor: Option<String>,
    #[serde(rename = "includeOutOfStock")]
    pub include_out_of_stock: Option<String>,
}

impl CategoryQuery {
    pub fn cursor(&self) -> Option<ProductId> {
        parse_cursor(self.cursor.as_deref())
    }

    pub fn stock_visibility(&self) -> StockVisibility {
        StockVisibility::from_query_flag(self.include_out_of_stock.as_deref())
    }
}

/// Non-numeric and zero cursors mean "from the start".
pub fn parse_cursor(raw: Option<&str>) -> Option<ProductId> {
    raw.and_then(|s| s.parse::<ProductId>().ok())
        .filter(|id| id.get() != 0)
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
    })
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> Items<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(s: &Subscription) -> Self {
        Self {
            product_id: s.product_id,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub product_id: ProductId,
    pub subscribed: bool,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeResponse {
    pub product_id: ProductId,
    pub removed: bool,
}
