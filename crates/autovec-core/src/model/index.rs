use std::collections::HashSet;
use std::fmt;

use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The kind of search index attached to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexKind {
    /// Full-text search index. Only read back from `$listSearchIndexes`;
    /// its `mappings` body is not modelled, so it cannot be submitted.
    Search,
    /// Vector-capable index used by `$vectorSearch`.
    VectorSearch,
}

impl IndexKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::VectorSearch => "vectorSearch",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content modality handed to the embedding provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
        }
    }
}

/// Similarity function of a pre-embedded vector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Similarity {
    Euclidean,
    Cosine,
    DotProduct,
}

/// One entry of a search index's `fields` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IndexField {
    /// A source field the database embeds itself using `model`.
    AutoEmbed {
        modality: Modality,
        path: String,
        model: String,
    },
    /// A field usable for equality and range filtering alongside
    /// vector similarity.
    Filter { path: String },
    /// A field that already holds client-computed vectors.
    Vector {
        path: String,
        #[serde(rename = "numDimensions")]
        num_dimensions: u32,
        similarity: Similarity,
    },
}

impl IndexField {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::AutoEmbed { path, .. } | Self::Filter { path } | Self::Vector { path, .. } => path,
        }
    }

    #[must_use]
    pub const fn is_embedding(&self) -> bool {
        matches!(self, Self::AutoEmbed { .. } | Self::Vector { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DefinitionBody {
    fields: Vec<IndexField>,
}

/// A named search index configuration attached to a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub kind: IndexKind,
    pub fields: Vec<IndexField>,
}

impl IndexDefinition {
    /// A vector search index that embeds `path` with `model`.
    #[must_use]
    pub fn auto_embed(
        name: impl Into<String>,
        path: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: IndexKind::VectorSearch,
            fields: vec![IndexField::AutoEmbed {
                modality: Modality::Text,
                path: path.into(),
                model: model.into(),
            }],
        }
    }

    #[must_use]
    pub fn with_filter(mut self, path: impl Into<String>) -> Self {
        self.fields.push(IndexField::Filter { path: path.into() });
        self
    }

    /// Rebuild a definition from the `latestDefinition` document reported
    /// by `$listSearchIndexes`.
    pub fn from_document(name: impl Into<String>, kind: IndexKind, body: Document) -> Result<Self> {
        let body: DefinitionBody = bson::from_document(body)?;
        Ok(Self {
            name: name.into(),
            kind,
            fields: body.fields,
        })
    }

    /// The field the index generates or reads embeddings from.
    #[must_use]
    pub fn embedding_field(&self) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.is_embedding())
    }

    /// The embedding model name, if this is an auto-embedding index.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.fields.iter().find_map(|f| match f {
            IndexField::AutoEmbed { model, .. } => Some(model.as_str()),
            _ => None,
        })
    }

    #[must_use]
    pub fn filter_paths(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| matches!(f, IndexField::Filter { .. }))
            .map(IndexField::path)
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidIndex("index name is blank".to_string()));
        }
        if self.kind != IndexKind::VectorSearch {
            return Err(Error::InvalidIndex(format!(
                "index '{}' is of kind '{}'; only vectorSearch indexes can be created",
                self.name, self.kind
            )));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            let path = field.path();
            if path.trim().is_empty() {
                return Err(Error::InvalidIndex(format!(
                    "field path is blank in index '{}'",
                    self.name
                )));
            }
            if !seen.insert(path) {
                return Err(Error::InvalidIndex(format!(
                    "path '{}' is declared more than once",
                    path
                )));
            }
            if let IndexField::AutoEmbed { model, .. } = field {
                if model.trim().is_empty() {
                    return Err(Error::InvalidIndex(format!(
                        "embedding model for '{}' is blank",
                        path
                    )));
                }
            }
        }

        let embedding_fields = self.fields.iter().filter(|f| f.is_embedding()).count();
        if embedding_fields != 1 {
            return Err(Error::InvalidIndex(format!(
                "a vectorSearch index needs exactly one embedding field, found {}",
                embedding_fields
            )));
        }

        Ok(())
    }

    /// The `definition` document submitted to the database.
    pub fn definition_document(&self) -> Result<Document> {
        Ok(bson::to_document(&DefinitionBody {
            fields: self.fields.clone(),
        })?)
    }

    /// Render the `createSearchIndexes` command for `collection`.
    pub fn create_command(&self, collection: &str) -> Result<Document> {
        self.validate()?;
        Ok(doc! {
            "createSearchIndexes": collection,
            "indexes": [
                {
                    "name": self.name.as_str(),
                    "type": self.kind.as_str(),
                    "definition": self.definition_document()?,
                }
            ],
        })
    }
}
