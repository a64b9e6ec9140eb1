pub mod article;
pub mod hit;
pub mod index;
pub mod query;
pub mod status;

pub use article::{validate_batch, Article};
pub use hit::{SearchHit, SearchResults};
pub use index::{IndexDefinition, IndexField, IndexKind, Modality, Similarity};
pub use query::{TitleFilter, VectorSearchQuery};
pub use status::SearchIndexStatus;
