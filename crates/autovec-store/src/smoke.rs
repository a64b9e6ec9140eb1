//! End-to-end embedding smoke test.
//!
//! Inserts a batch of articles, waits for the store to embed them, then
//! runs one semantic query. The results are returned for inspection; no
//! assertion is made on them.

use autovec_core::model::{validate_batch, Article, SearchResults, VectorSearchQuery};

use crate::error::StoreResult;
use crate::store::SearchStore;
use crate::wait::{WaitOutcome, WaitStrategy};

/// The smoke test's reference query.
pub const DEFAULT_QUERY: &str = "AI algorithms that learn from data";

#[derive(Debug, Clone, PartialEq)]
pub struct SmokeReport {
    pub inserted: usize,
    pub wait: WaitOutcome,
    pub results: SearchResults,
}

#[derive(Debug)]
pub struct SmokeTest<'a, S: SearchStore + ?Sized> {
    store: &'a S,
    collection: String,
    articles: Vec<Article>,
    wait: WaitStrategy,
    query: VectorSearchQuery,
}

impl<'a, S: SearchStore + ?Sized> SmokeTest<'a, S> {
    /// A smoke test that inserts the sample articles.
    pub fn new(
        store: &'a S,
        collection: impl Into<String>,
        wait: WaitStrategy,
        query: VectorSearchQuery,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            articles: Article::samples(),
            wait,
            query,
        }
    }

    #[must_use]
    pub fn with_articles(mut self, articles: Vec<Article>) -> Self {
        self.articles = articles;
        self
    }

    #[must_use]
    pub fn query(&self) -> &VectorSearchQuery {
        &self.query
    }

    #[must_use]
    pub const fn wait_strategy(&self) -> WaitStrategy {
        self.wait
    }

    /// Check the articles and the query before anything is written.
    pub fn validate(&self) -> StoreResult<()> {
        validate_batch(&self.articles)?;
        self.query.validate()?;
        Ok(())
    }

    /// Step 1: insert every article in one batch.
    ///
    /// Not idempotent: each call adds another copy of the articles.
    pub async fn insert(&self) -> StoreResult<usize> {
        validate_batch(&self.articles)?;
        self.store.insert_articles(&self.collection, &self.articles).await
    }

    /// Step 2: give the store time to generate embeddings.
    pub async fn wait(&self) -> StoreResult<WaitOutcome> {
        self.wait
            .wait(self.store, &self.collection, &self.query.index)
            .await
    }

    /// Step 3: run the semantic query.
    pub async fn search(&self) -> StoreResult<SearchResults> {
        let results = self.store.vector_search(&self.collection, &self.query).await?;
        if results.is_empty() {
            log::warn!("Query returned no results; embeddings may not be ready yet");
        } else if !results.is_score_ordered() {
            log::warn!("Results are not ordered by descending score");
        }
        Ok(results)
    }

    /// Run all three steps in order.
    pub async fn run(&self) -> StoreResult<SmokeReport> {
        self.validate()?;
        let inserted = self.insert().await?;
        let wait = self.wait().await?;
        let results = self.search().await?;
        Ok(SmokeReport {
            inserted,
            wait,
            results,
        })
    }
}
