use bson::Document;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::index::{IndexDefinition, IndexField, IndexKind};

/// Status reported by the database when the index can serve queries.
pub const READY: &str = "READY";

/// One entry returned by the `$listSearchIndexes` aggregation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexStatus {
    pub name: String,

    /// `search` or `vectorSearch`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    /// Build status such as `PENDING`, `BUILDING`, `READY` or `FAILED`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub queryable: bool,

    #[serde(default)]
    pub latest_definition: Option<Document>,
}

impl SearchIndexStatus {
    pub fn from_document(doc: Document) -> Result<Self> {
        Ok(bson::from_document(doc)?)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.queryable && self.status.as_deref() == Some(READY)
    }

    #[must_use]
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or("UNKNOWN")
    }

    /// The stored definition, if the database reported one.
    pub fn definition(&self) -> Result<Option<IndexDefinition>> {
        let Some(body) = &self.latest_definition else {
            return Ok(None);
        };
        let kind = match self.kind.as_deref() {
            Some("vectorSearch") => IndexKind::VectorSearch,
            _ => IndexKind::Search,
        };
        IndexDefinition::from_document(self.name.as_str(), kind, body.clone()).map(Some)
    }

    /// True when the stored embedding field has the same path, modality
    /// and model as `expected`.
    ///
    /// A definition the database reports in a shape this crate cannot
    /// read never matches.
    #[must_use]
    pub fn matches(&self, expected: &IndexDefinition) -> bool {
        let Ok(Some(stored)) = self.definition() else {
            return false;
        };
        match (stored.embedding_field(), expected.embedding_field()) {
            (
                Some(IndexField::AutoEmbed {
                    modality: stored_modality,
                    path: stored_path,
                    model: stored_model,
                }),
                Some(IndexField::AutoEmbed {
                    modality,
                    path,
                    model,
                }),
            ) => stored_modality == modality && stored_path == path && stored_model == model,
            (Some(stored_field), Some(expected_field)) => stored_field == expected_field,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn listed(status: &str, queryable: bool, model: &str) -> Document {
        doc! {
            "id": "6524096020da840844a4c4a7",
            "name": "vector_index",
            "type": "vectorSearch",
            "status": status,
            "queryable": queryable,
            "latestDefinitionVersion": { "version": 0 },
            "latestDefinition": {
                "fields": [
                    { "type": "autoEmbed", "modality": "text", "path": "content", "model": model },
                    { "type": "filter", "path": "title" },
                ]
            },
        }
    }

    fn expected() -> IndexDefinition {
        IndexDefinition::auto_embed("vector_index", "content", "voyage-4").with_filter("title")
    }

    #[test]
    fn test_ready_index() {
        let status = SearchIndexStatus::from_document(listed("READY", true, "voyage-4")).unwrap();
        assert!(status.is_ready());
        assert_eq!(status.kind.as_deref(), Some("vectorSearch"));
        assert!(status.matches(&expected()));
    }

    #[test]
    fn test_building_index_not_ready() {
        let status = SearchIndexStatus::from_document(listed("BUILDING", false, "voyage-4")).unwrap();
        assert!(!status.is_ready());
        assert_eq!(status.status_label(), "BUILDING");
    }

    #[test]
    fn test_ready_status_requires_queryable() {
        let status = SearchIndexStatus::from_document(listed("READY", false, "voyage-4")).unwrap();
        assert!(!status.is_ready());
    }

    #[test]
    fn test_model_mismatch() {
        let status = SearchIndexStatus::from_document(listed("READY", true, "voyage-3")).unwrap();
        assert!(!status.matches(&expected()));
    }

    #[test]
    fn test_definition_round_trip() {
        let status = SearchIndexStatus::from_document(listed("READY", true, "voyage-4")).unwrap();
        let stored = status.definition().unwrap().unwrap();
        assert_eq!(stored, expected());
    }

    #[test]
    fn test_minimal_entry() {
        let status = SearchIndexStatus::from_document(doc! { "name": "pending_index" }).unwrap();
        assert!(!status.is_ready());
        assert_eq!(status.status_label(), "UNKNOWN");
        assert!(status.definition().unwrap().is_none());
        assert!(!status.matches(&expected()));
    }
}
