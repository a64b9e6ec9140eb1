//! Index provisioning.

use autovec_core::model::IndexDefinition;

use crate::error::StoreResult;
use crate::store::SearchStore;

/// What the provisioner did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// `<database>.<collection>` the index was attached to.
    pub namespace: String,
    /// Whether this run created the collection.
    pub collection_created: bool,
    /// Index name the store registered.
    pub index_name: String,
    /// Embedded field path, if the definition has one.
    pub embedding_path: Option<String>,
    /// Embedding model, if this is an auto-embedding index.
    pub model: Option<String>,
}

/// Ensures a collection exists and declares a search index on it.
///
/// The call returns once the store accepts the definition. The index
/// build and the embedding backfill run afterwards inside the store.
#[derive(Debug)]
pub struct Provisioner<'a, S: SearchStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SearchStore + ?Sized> Provisioner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Create `collection` if needed, then submit `definition`.
    ///
    /// # Errors
    /// Returns a validation error before touching the store if the
    /// definition is malformed. Store failures (an existing index with an
    /// incompatible definition, an unknown model, an unreachable server)
    /// are returned as reported.
    pub async fn provision(
        &self,
        collection: &str,
        definition: &IndexDefinition,
    ) -> StoreResult<ProvisionReport> {
        definition.validate()?;

        let collection_created = self.store.ensure_collection(collection).await?;
        let index_name = self.store.create_search_index(collection, definition).await?;

        Ok(ProvisionReport {
            namespace: self.store.namespace(collection),
            collection_created,
            index_name,
            embedding_path: definition.embedding_field().map(|f| f.path().to_string()),
            model: definition.model().map(str::to_string),
        })
    }
}
