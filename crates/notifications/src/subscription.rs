use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dealwatch_core::{ProductId, UserId};

/// A user's alert on one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(user_id: UserId, product_id: ProductId, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            product_id,
            created_at,
        }
    }

    pub fn key(&self) -> (UserId, ProductId) {
        (self.user_id, self.product_id)
    }
}
