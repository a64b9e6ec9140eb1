use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An encyclopedia-style article stored in the search collection.
///
/// Articles carry no client-side identifier; the database assigns `_id`
/// on insert. `content` is the field the search index embeds and `title`
/// is indexed as a filter field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
}

impl Article {
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// The three reference articles used by the embedding smoke test.
    #[must_use]
    pub fn samples() -> Vec<Self> {
        vec![
            Self::new(
                "Machine Learning",
                "Machine learning is a subset of artificial intelligence that enables systems to learn and improve from experience without being explicitly programmed. It focuses on developing algorithms that can access data and use it to learn for themselves.",
            ),
            Self::new(
                "Neural Networks",
                "Artificial neural networks are computing systems inspired by biological neural networks. They consist of interconnected nodes that process information using connectionist approaches to computation.",
            ),
            Self::new(
                "Deep Learning",
                "Deep learning is part of a broader family of machine learning methods based on artificial neural networks with representation learning. It can be supervised, semi-supervised or unsupervised.",
            ),
        ]
    }

    /// Parse a JSON array of `{ "title": ..., "content": ... }` objects.
    pub fn from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that the article can be embedded and filtered.
    ///
    /// `position` is the article's index within its batch and is only
    /// used for error reporting.
    pub fn validate(&self, position: usize) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidArticle {
                position,
                reason: "title is blank".to_string(),
            });
        }
        if self.content.trim().is_empty() {
            return Err(Error::InvalidArticle {
                position,
                reason: "content is blank".to_string(),
            });
        }
        Ok(())
    }
}

/// Validate every article in a batch before any of them is written.
///
/// Returns the first failure; an empty batch is rejected as well since
/// the database refuses an empty bulk insert.
pub fn validate_batch(articles: &[Article]) -> Result<()> {
    if articles.is_empty() {
        return Err(Error::InvalidArticle {
            position: 0,
            reason: "batch is empty".to_string(),
        });
    }
    articles
        .iter()
        .enumerate()
        .try_for_each(|(position, article)| article.validate(position))
}
