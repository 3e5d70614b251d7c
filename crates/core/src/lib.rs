//! `dealwatch-core`: shared building blocks.
//!
//! This crate holds **pure** primitives used by every other crate: strongly
//! typed identifiers and the opaque storage error. No infrastructure here.

pub mod error;
pub mod id;

pub use error::{StoreError, StoreResult};
pub use id::{CategoryId, ProductId, UserId};
