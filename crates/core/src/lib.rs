pub mod chunking;
pub mod cleaner;
pub mod embeddings;
mod endpoint;
pub mod error;
pub mod frontmatter;
pub mod generation;
pub mod indexing;
pub mod ingest;
pub mod models;
pub mod prompt;
pub mod query;
pub mod stores;
pub mod traits;

pub use chunking::{build_chunks, chunk_by_heading, normalize_whitespace, HEADING_MARKER};
pub use cleaner::{clean_content, ContentCleaner};
pub use embeddings::{HashingEmbedder, OllamaEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{IngestError, PipelineError, ServiceError};
pub use frontmatter::extract_frontmatter;
pub use generation::OllamaGenerator;
pub use indexing::IndexingPipeline;
pub use ingest::{discover_documents, load_document, parse_document, slug_from_path, DEFAULT_EXTENSIONS};
pub use models::{
    Chunk, ChunkIdStrategy, Distance, Document, FolderReport, IndexReport, IndexedPoint,
    IndexingOptions, Metadata, OllamaConfig, QueryAnswer, QueryOptions, ScoredPoint,
    SkippedDocument,
};
pub use prompt::{render_context, AugmentedPrompt};
pub use query::QueryPipeline;
pub use stores::{InMemoryVectorStore, QdrantStore};
pub use traits::{EmbeddingClient, GenerationClient, VectorStore};
