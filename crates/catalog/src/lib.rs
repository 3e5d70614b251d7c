//! Catalog domain module (read side).
//!
//! Business rules for browsing the product catalog: which rows a listing may
//! contain, how a filter token orders them, and which fields leave the
//! process. Storage is reached only through the [`CatalogStore`] trait.

pub mod condition;
pub mod filter;
pub mod product;
pub mod projection;
pub mod service;
pub mod store;

pub use condition::{Condition, Predicate, StockVisibility, build_condition};
pub use filter::{FilterToken, InvalidFilterError, SortDirection, SortField, SortSpec, resolve_sort};
pub use product::{Category, MarketplaceIds, Product};
pub use projection::{CategorySummary, ProductDetail, ProductSummary};
pub use service::{CatalogError, CatalogQueryService, SIMILAR_LIMIT, TOP_DISCOUNT_LIMIT};
pub use store::{CatalogStore, ProductQuery};
