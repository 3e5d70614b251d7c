use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, instrument};

use dealwatch_catalog::CatalogStore;
use dealwatch_core::{ProductId, StoreError, UserId};

use crate::store::SubscriptionStore;
use crate::subscription::Subscription;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("product not found")]
    NotFoundProduct,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Subscription operations. Product existence is checked against the catalog.
#[derive(Debug, Clone)]
pub struct NotificationService<S, C> {
    subscriptions: S,
    catalog: C,
}

impl<S, C> NotificationService<S, C>
where
    S: SubscriptionStore,
    C: CatalogStore,
{
    pub fn new(subscriptions: S, catalog: C) -> Self {
        Self { subscriptions, catalog }
    }

    #[instrument(skip(self))]
    pub async fn exists(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, NotificationError> {
        Ok(self.subscriptions.find(user_id, product_id).await?.is_some())
    }

    /// Create the subscription if it is missing.
    ///
    /// Repeat calls for the same pair return the original row untouched.
    #[instrument(skip(self))]
    pub async fn subscribe(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Subscription, NotificationError> {
        if let Some(existing) = self.subscriptions.find(user_id, product_id).await? {
            debug!("already subscribed");
            return Ok(existing);
        }

        if self.catalog.find_product(product_id).await?.is_none() {
            return Err(NotificationError::NotFoundProduct);
        }

        let created = self
            .subscriptions
            .insert_if_absent(Subscription::new(user_id, product_id, Utc::now()))
            .await?;
        debug!("subscription created");
        Ok(created)
    }

    /// Remove the subscription; `false` when there was none.
    #[instrument(skip(self))]
    pub async fn unsubscribe(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, NotificationError> {
        Ok(self.subscriptions.delete(user_id, product_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Subscription>, NotificationError> {
        Ok(self.subscriptions.list_for_user(user_id).await?)
    }

    /// Which of `product_ids` the caller has alerts on; `None` for anonymous callers.
    pub async fn enabled_among(
        &self,
        user_id: Option<UserId>,
        product_ids: &[ProductId],
    ) -> Result<Option<HashSet<ProductId>>, NotificationError> {
        let Some(user_id) = user_id else {
            return Ok(None);
        };
        if product_ids.is_empty() {
            return Ok(Some(HashSet::new()));
        }
        let ids = self.subscriptions.subscribed_among(user_id, product_ids).await?;
        Ok(Some(ids.into_iter().collect()))
    }
}
