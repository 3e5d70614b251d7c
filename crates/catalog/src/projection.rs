//! Externally visible product shapes.
//!
//! Projections select fields; they never compute or reformat values.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dealwatch_core::{CategoryId, ProductId};

use crate::product::{Category, Product};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

impl From<&Category> for CategorySummary {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
        }
    }
}

/// Listing projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub marketplace_product_id: String,
    pub marketplace_item_id: Option<String>,
    pub marketplace_vendor_item_id: Option<String>,
    pub name: String,
    pub image_url: String,
    pub is_out_of_stock: bool,
    pub original_price: i64,
    pub price: i64,
    pub discount_rate: Option<i32>,
    pub card_discount: i64,
    pub categories: Vec<CategorySummary>,
    /// Present only for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_enabled: Option<bool>,
}

impl ProductSummary {
    pub fn project(product: &Product, notification_enabled: Option<bool>) -> Self {
        Self {
            marketplace_product_id: product.marketplace.product_id.clone(),
            marketplace_item_id: product.marketplace.item_id.clone(),
            marketplace_vendor_item_id: product.marketplace.vendor_item_id.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            is_out_of_stock: product.is_out_of_stock,
            original_price: product.original_price,
            price: product.price,
            discount_rate: product.discount_rate,
            card_discount: product.card_discount,
            categories: product.categories.iter().map(CategorySummary::from).collect(),
            notification_enabled,
        }
    }
}

/// Detail projection: the listing fields plus the internal id, both URLs and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    pub id: ProductId,
    #[serde(flatten)]
    pub summary: ProductSummary,
    pub url: String,
    pub affiliate_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductDetail {
    pub fn project(product: &Product, notification_enabled: Option<bool>) -> Self {
        Self {
            id: product.id,
            summary: ProductSummary::project(product, notification_enabled),
            url: product.url.clone(),
            affiliate_url: product.affiliate_url.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::MarketplaceIds;
    use chrono::TimeZone;

    fn sample() -> Product {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Product {
            id: ProductId::new(7),
            marketplace: MarketplaceIds {
                product_id: "mp-7".to_string(),
                item_id: Some("it-7".to_string()),
                vendor_item_id: None,
            },
            name: "Trail Runner".to_string(),
            image_url: "https://img.example/7.jpg".to_string(),
            is_out_of_stock: false,
            original_price: 100_000,
            price: 80_000,
            discount_rate: Some(20),
            card_discount: 5_000,
            url: "https://shop.example/p/7".to_string(),
            affiliate_url: "https://link.example/a/7".to_string(),
            created_at: at,
            updated_at: at,
            categories: vec![Category {
                id: CategoryId::new(1),
                name: "shoes".to_string(),
            }],
        }
    }

    #[test]
    fn summary_hides_internal_id_and_urls() {
        let json = serde_json::to_value(ProductSummary::project(&sample(), None)).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("url"));
        assert!(!obj.contains_key("affiliate_url"));
        assert!(!obj.contains_key("notification_enabled"));
        assert_eq!(json["marketplace_product_id"], "mp-7");
        assert_eq!(json["categories"][0]["name"], "shoes");
    }

    #[test]
    fn detail_adds_id_and_urls() {
        let json = serde_json::to_value(ProductDetail::project(&sample(), Some(true))).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["url"], "https://shop.example/p/7");
        assert_eq!(json["affiliate_url"], "https://link.example/a/7");
        assert_eq!(json["price"], 80_000);
        assert_eq!(json["notification_enabled"], true);
    }
}
