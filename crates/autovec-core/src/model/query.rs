use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The database refuses `numCandidates` above this value.
pub const MAX_NUM_CANDIDATES: u32 = 10_000;

/// Equality filter on an indexed filter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleFilter {
    pub path: String,
    pub value: String,
}

impl TitleFilter {
    #[must_use]
    pub fn equals(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    fn to_document(&self) -> Document {
        let mut filter = Document::new();
        filter.insert(self.path.clone(), doc! { "$eq": self.value.as_str() });
        filter
    }
}

/// A natural-language semantic query against an auto-embedding index.
///
/// `num_candidates` is the over-fetch hint: how many approximate nearest
/// neighbours the engine considers before ranking and truncating to
/// `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorSearchQuery {
    pub index: String,
    pub path: String,
    pub text: String,
    pub num_candidates: u32,
    pub limit: u32,
    pub filter: Option<TitleFilter>,
}

impl VectorSearchQuery {
    /// Query `path` through `index` with the smoke-test defaults
    /// (100 candidates, 10 results).
    #[must_use]
    pub fn new(index: impl Into<String>, path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            path: path.into(),
            text: text.into(),
            num_candidates: 100,
            limit: 10,
            filter: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_num_candidates(mut self, num_candidates: u32) -> Self {
        self.num_candidates = num_candidates;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: TitleFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::InvalidQuery("query text is blank".to_string()));
        }
        if self.index.trim().is_empty() || self.path.trim().is_empty() {
            return Err(Error::InvalidQuery(
                "index name and path are required".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(Error::InvalidQuery("limit must be at least 1".to_string()));
        }
        if self.num_candidates < self.limit {
            return Err(Error::InvalidQuery(format!(
                "numCandidates ({}) must be at least limit ({})",
                self.num_candidates, self.limit
            )));
        }
        if self.num_candidates > MAX_NUM_CANDIDATES {
            return Err(Error::InvalidQuery(format!(
                "numCandidates ({}) exceeds {}",
                self.num_candidates, MAX_NUM_CANDIDATES
            )));
        }
        Ok(())
    }

    /// Render the `$vectorSearch` + `$project` aggregation pipeline.
    ///
    /// The projection drops `_id`, keeps `title` and `content`, and adds
    /// the engine's relevance score as `score`.
    pub fn to_pipeline(&self) -> Result<Vec<Document>> {
        self.validate()?;

        let mut stage = doc! {
            "index": self.index.as_str(),
            "path": self.path.as_str(),
            "query": { "text": self.text.as_str() },
            "numCandidates": i64::from(self.num_candidates),
            "limit": i64::from(self.limit),
        };
        if let Some(filter) = &self.filter {
            stage.insert("filter", filter.to_document());
        }

        Ok(vec![
            doc! { "$vectorSearch": stage },
            doc! {
                "$project": {
                    "_id": 0,
                    "title": 1,
                    "content": 1,
                    "score": { "$meta": "vectorSearchScore" },
                }
            },
        ])
    }
}
