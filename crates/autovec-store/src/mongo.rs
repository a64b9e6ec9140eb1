//! MongoDB implementation of [`SearchStore`].
//!
//! Search indexes are created through the `createSearchIndexes` command
//! and read back through the `$listSearchIndexes` aggregation stage, the
//! same calls the shell helpers issue.

use async_trait::async_trait;
use autovec_core::model::{
    validate_batch, Article, IndexDefinition, SearchHit, SearchIndexStatus, SearchResults,
    VectorSearchQuery,
};
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::ErrorKind;
use mongodb::{Client, Database};

use crate::error::{StoreError, StoreResult};
use crate::store::SearchStore;

/// Server error code for creating a collection that already exists.
const NAMESPACE_EXISTS: i32 = 48;

/// A connection to one database on a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to `uri` and select `database`.
    ///
    /// The driver connects lazily; an unreachable server surfaces on the
    /// first command.
    pub async fn connect(uri: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        log::debug!("Connected client for database '{}'", database);
        Ok(Self {
            db: client.database(database),
        })
    }

    #[must_use]
    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

fn is_namespace_exists(err: &mongodb::error::Error) -> bool {
    matches!(err.kind.as_ref(), ErrorKind::Command(cmd) if cmd.code == NAMESPACE_EXISTS)
}

/// Extract the registered index name from a `createSearchIndexes` reply.
fn created_index_name(reply: &Document) -> StoreResult<String> {
    let unexpected = |message: &str| StoreError::UnexpectedReply {
        command: "createSearchIndexes".to_string(),
        message: message.to_string(),
    };

    let created = reply
        .get_array("indexesCreated")
        .map_err(|_| unexpected("missing indexesCreated"))?;

    created
        .first()
        .and_then(|entry| entry.as_document())
        .and_then(|entry| entry.get_str("name").ok())
        .map(str::to_string)
        .ok_or_else(|| unexpected("indexesCreated has no named entry"))
}

#[async_trait]
impl SearchStore for MongoStore {
    fn namespace(&self, collection: &str) -> String {
        format!("{}.{}", self.db.name(), collection)
    }

    async fn ensure_collection(&self, collection: &str) -> StoreResult<bool> {
        let existing = self.db.list_collection_names().await?;
        if existing.iter().any(|name| name == collection) {
            log::debug!("Collection {} already exists", self.namespace(collection));
            return Ok(false);
        }

        match self.db.create_collection(collection).await {
            Ok(()) => {
                log::info!("Created collection {}", self.namespace(collection));
                Ok(true)
            }
            // Created concurrently between the listing and the create.
            Err(e) if is_namespace_exists(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_search_index(
        &self,
        collection: &str,
        definition: &IndexDefinition,
    ) -> StoreResult<String> {
        let command = definition.create_command(collection)?;
        log::debug!("Submitting createSearchIndexes: {}", command);

        let reply = self.db.run_command(command).await?;
        let name = created_index_name(&reply)?;

        log::info!(
            "Search index '{}' ({}) accepted on {}",
            name,
            definition.kind,
            self.namespace(collection)
        );
        Ok(name)
    }

    async fn list_search_indexes(
        &self,
        collection: &str,
        name: Option<&str>,
    ) -> StoreResult<Vec<SearchIndexStatus>> {
        let stage = match name {
            Some(name) => doc! { "$listSearchIndexes": { "name": name } },
            None => doc! { "$listSearchIndexes": {} },
        };

        let cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(vec![stage])
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        docs.into_iter()
            .map(|doc| SearchIndexStatus::from_document(doc).map_err(StoreError::from))
            .collect()
    }

    async fn insert_articles(&self, collection: &str, articles: &[Article]) -> StoreResult<usize> {
        validate_batch(articles)?;

        let result = self
            .db
            .collection::<Article>(collection)
            .insert_many(articles)
            .await?;

        log::info!(
            "Inserted {} documents into {}",
            result.inserted_ids.len(),
            self.namespace(collection)
        );
        Ok(result.inserted_ids.len())
    }

    async fn count_documents(&self, collection: &str) -> StoreResult<u64> {
        Ok(self
            .db
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?)
    }

    async fn vector_search(
        &self,
        collection: &str,
        query: &VectorSearchQuery,
    ) -> StoreResult<SearchResults> {
        let pipeline = query.to_pipeline()?;
        log::debug!("Running $vectorSearch on {}: {:?}", self.namespace(collection), pipeline);

        let cursor = self
            .db
            .collection::<Document>(collection)
            .aggregate(pipeline)
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;

        let hits = docs
            .into_iter()
            .map(|doc| bson::from_document::<SearchHit>(doc).map_err(autovec_core::Error::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchResults::new(hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_index_name() {
        let reply = doc! {
            "indexesCreated": [
                { "id": "65a0c0b6f8b8a2a1b0c0d0e0", "name": "vector_index" }
            ],
            "ok": 1,
        };
        assert_eq!(created_index_name(&reply).unwrap(), "vector_index");
    }

    #[test]
    fn test_created_index_name_missing() {
        let reply = doc! { "ok": 1 };
        let err = created_index_name(&reply).unwrap_err();
        assert!(matches!(err, StoreError::UnexpectedReply { .. }));
    }

    #[test]
    fn test_created_index_name_empty_list() {
        let reply = doc! { "indexesCreated": [], "ok": 1 };
        assert!(created_index_name(&reply).is_err());
    }

    #[tokio::test]
    async fn test_namespace_label() {
        let store = MongoStore::connect("mongodb://localhost:27020/wikipedia", "wikipedia")
            .await
            .unwrap();
        assert_eq!(store.namespace("articles"), "wikipedia.articles");
        assert_eq!(store.database_name(), "wikipedia");
    }
}
