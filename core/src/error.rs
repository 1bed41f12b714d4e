//! Internal error kinds for the storage layer.
//!
//! The public `Store` API never returns these: failures surface as `false`,
//! `None` or an empty collection. They exist so the log says *why*.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("quota exceeded writing '{key}': {needed} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    #[error("stored data under '{key}' is unreadable: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
