//! Price-alert subscriptions.
//!
//! A subscription is nothing more than a (user, product) pair; its existence
//! means the user wants to hear about that product.

pub mod service;
pub mod store;
pub mod subscription;

pub use service::{NotificationError, NotificationService};
pub use store::SubscriptionStore;
pub use subscription::Subscription;
