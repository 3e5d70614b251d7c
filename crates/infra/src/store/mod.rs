//! Catalog and subscription stores.
//!
//! Two backends implement the domain traits: an in-memory one for tests and
//! local development, and PostgreSQL via `sqlx` for everything else.

pub mod in_memory;
pub mod postgres;

pub use in_memory::{InMemoryCatalogStore, InMemorySubscriptionStore};
pub use postgres::{PostgresCatalogStore, PostgresSubscriptionStore, connect};
