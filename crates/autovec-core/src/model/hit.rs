use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One projected document returned by a semantic query.
///
/// `score` is the engine's relevance score; higher is more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub score: f64,
}

/// Hits in the order the engine returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResults(Vec<SearchHit>);

impl SearchResults {
    #[must_use]
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self(hits)
    }

    #[must_use]
    pub fn hits(&self) -> &[SearchHit] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when scores never increase from one hit to the next.
    #[must_use]
    pub fn is_score_ordered(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0].score >= pair[1].score)
    }

    #[must_use]
    pub fn top_title(&self) -> Option<&str> {
        self.0.first().map(|hit| hit.title.as_str())
    }

    /// Zero-based rank of the first hit with `title`.
    #[must_use]
    pub fn rank_of(&self, title: &str) -> Option<usize> {
        self.0.iter().position(|hit| hit.title == title)
    }

    /// Pretty-printed JSON array of the hits, for operator inspection.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}
