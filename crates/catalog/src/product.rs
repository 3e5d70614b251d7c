use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealwatch_core::{CategoryId, ProductId};

/// Identifiers of the product on the external marketplace it was scraped from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceIds {
    pub product_id: String,
    pub item_id: Option<String>,
    pub vendor_item_id: Option<String>,
}

/// Category row. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Persisted product together with its joined categories.
///
/// Prices are in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub marketplace: MarketplaceIds,
    pub name: String,
    pub image_url: String,
    pub is_out_of_stock: bool,
    pub original_price: i64,
    pub price: i64,
    /// Percent off the original price; `None` when the marketplace reports no discount.
    pub discount_rate: Option<i32>,
    pub card_discount: i64,
    pub url: String,
    pub affiliate_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub categories: Vec<Category>,
}

impl Product {
    pub fn is_in_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c.name == name)
    }

    pub fn category_ids(&self) -> Vec<CategoryId> {
        self.categories.iter().map(|c| c.id).collect()
    }
}
