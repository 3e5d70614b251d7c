//! Storage error model.

use thiserror::Error;

/// Result type returned by every store boundary.
pub type StoreResult<T> = Result<T, StoreError>;

/// Opaque infrastructure failure raised by a store.
///
/// Domain services never inspect this; they pass it through so the transport
/// layer can map it to a generic server error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing database rejected or failed a query.
    #[error("database error in {operation}: {message}")]
    Database { operation: String, message: String },

    /// The connection pool is closed or could not hand out a connection.
    #[error("connection unavailable in {operation}: {message}")]
    Unavailable { operation: String, message: String },

    /// A row came back in a shape the store could not decode.
    #[error("failed to decode row in {operation}: {message}")]
    Decode { operation: String, message: String },
}

impl StoreError {
    pub fn database(operation: &str, message: impl Into<String>) -> Self {
        Self::Database {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn unavailable(operation: &str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn decode(operation: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}
