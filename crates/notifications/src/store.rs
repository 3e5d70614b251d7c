use std::sync::Arc;

use async_trait::async_trait;

use dealwatch_core::{ProductId, StoreResult, UserId};

use crate::subscription::Subscription;

/// Persistence boundary for subscriptions, keyed by (user, product).
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<Option<Subscription>>;

    /// Insert `subscription` unless the pair already exists; returns the stored row.
    async fn insert_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription>;

    /// Returns whether a row was removed.
    async fn delete(&self, user_id: UserId, product_id: ProductId) -> StoreResult<bool>;

    /// Newest first.
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Subscription>>;

    /// The subset of `product_ids` this user is subscribed to.
    async fn subscribed_among(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> StoreResult<Vec<ProductId>>;
}

#[async_trait]
impl<S> SubscriptionStore for Arc<S>
where
    S: SubscriptionStore + ?Sized,
{
    async fn find(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> StoreResult<Option<Subscription>> {
        (**self).find(user_id, product_id).await
    }

    async fn insert_if_absent(&self, subscription: Subscription) -> StoreResult<Subscription> {
        (**self).insert_if_absent(subscription).await
    }

    async fn delete(&self, user_id: UserId, product_id: ProductId) -> StoreResult<bool> {
        (**self).delete(user_id, product_id).await
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<Subscription>> {
        (**self).list_for_user(user_id).await
    }

    async fn subscribed_among(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> StoreResult<Vec<ProductId>> {
        (**self).subscribed_among(user_id, product_ids).await
    }
}
