//! Error types for talking to the search store.

use thiserror::Error;

/// Errors that can occur while provisioning, writing or querying.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error propagated from the MongoDB driver.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A document, index definition or query failed validation.
    #[error(transparent)]
    Core(#[from] autovec_core::Error),

    /// The database replied to a command in an unexpected shape.
    #[error("unexpected reply to {command}: {message}")]
    UnexpectedReply { command: String, message: String },

    /// No search index with this name exists on the collection.
    #[error("search index '{name}' not found on {collection}")]
    IndexNotFound { name: String, collection: String },

    /// The search index exists but cannot serve queries yet.
    #[error("search index '{name}' is not ready (status: {status})")]
    IndexNotReady { name: String, status: String },
}

impl StoreError {
    /// Returns `true` while waiting longer may let the index become
    /// queryable.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::IndexNotReady { .. })
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_is_retryable() {
        let err = StoreError::IndexNotReady {
            name: "vector_index".to_string(),
            status: "BUILDING".to_string(),
        };
        assert!(err.is_not_ready());
        assert_eq!(
            err.to_string(),
            "search index 'vector_index' is not ready (status: BUILDING)"
        );
    }

    #[test]
    fn test_missing_index_is_not_retryable() {
        let err = StoreError::IndexNotFound {
            name: "vector_index".to_string(),
            collection: "articles".to_string(),
        };
        assert!(!err.is_not_ready());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: StoreError =
            autovec_core::Error::InvalidQuery("query text is blank".to_string()).into();
        assert_eq!(err.to_string(), "invalid query: query text is blank");
    }
}
