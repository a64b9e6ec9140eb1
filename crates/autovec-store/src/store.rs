//! The seam between the operator workflows and the database.

use async_trait::async_trait;
use autovec_core::model::{Article, IndexDefinition, SearchIndexStatus, SearchResults, VectorSearchQuery};

use crate::error::{StoreError, StoreResult};

/// A document store with managed vector search and auto-embedding.
///
/// Index builds and embedding generation happen inside the store;
/// implementations only submit requests and report what the store says.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Human-readable `<database>.<collection>` label for status lines.
    fn namespace(&self, collection: &str) -> String;

    /// Create `collection` if it does not exist.
    ///
    /// Returns `true` when the collection was created by this call.
    async fn ensure_collection(&self, collection: &str) -> StoreResult<bool>;

    /// Submit a search index definition. Returns the name the store
    /// registered. Does not wait for the index build.
    async fn create_search_index(
        &self,
        collection: &str,
        definition: &IndexDefinition,
    ) -> StoreResult<String>;

    /// List search indexes on `collection`, optionally only `name`.
    async fn list_search_indexes(
        &self,
        collection: &str,
        name: Option<&str>,
    ) -> StoreResult<Vec<SearchIndexStatus>>;

    /// Insert `articles` as one batch. Returns the number inserted.
    async fn insert_articles(&self, collection: &str, articles: &[Article]) -> StoreResult<usize>;

    async fn count_documents(&self, collection: &str) -> StoreResult<u64>;

    /// Run a semantic query and return hits in engine order.
    async fn vector_search(
        &self,
        collection: &str,
        query: &VectorSearchQuery,
    ) -> StoreResult<SearchResults>;

    /// Status of a single named index.
    async fn index_status(&self, collection: &str, name: &str) -> StoreResult<SearchIndexStatus> {
        self.list_search_indexes(collection, Some(name))
            .await?
            .into_iter()
            .find(|status| status.name == name)
            .ok_or_else(|| StoreError::IndexNotFound {
                name: name.to_string(),
                collection: self.namespace(collection),
            })
    }

    /// Succeeds only when the named index is ready to serve queries.
    async fn probe_ready(&self, collection: &str, name: &str) -> StoreResult<SearchIndexStatus> {
        let status = self.index_status(collection, name).await?;
        if status.is_ready() {
            Ok(status)
        } else {
            Err(StoreError::IndexNotReady {
                name: name.to_string(),
                status: status.status_label().to_string(),
            })
        }
    }
}
