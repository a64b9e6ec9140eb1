use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid article at position {position}: {reason}")]
    InvalidArticle { position: usize, reason: String },

    #[error("invalid index definition: {0}")]
    InvalidIndex(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("BSON serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("BSON deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
