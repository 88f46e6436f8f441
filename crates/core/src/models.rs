use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Ordered key/value metadata; also the payload stored next to each vector.
pub type Metadata = Map<String, Value>;

pub const CONTENT_FIELD: &str = "content";
pub const SLUG_FIELD: &str = "slug";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source_path: String,
    pub metadata: Metadata,
    pub body: String,
}

impl Document {
    pub fn slug(&self) -> Option<&str> {
        self.metadata.get(SLUG_FIELD).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: String,
    pub ordinal: u64,
    pub text: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexedPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub score: f64,
    pub payload: Metadata,
}

impl ScoredPoint {
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Distance {
    #[default]
    Cosine,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ChunkIdStrategy {
    /// Fresh UUID v4 per chunk; re-ingesting a document appends new points.
    #[default]
    Random,
    /// UUID v5 over slug and ordinal; re-ingesting overwrites prior points.
    Deterministic,
}

#[derive(Debug, Clone)]
pub struct IndexingOptions {
    pub collection: String,
    pub dimension: usize,
    pub distance: Distance,
    pub id_strategy: ChunkIdStrategy,
    pub embed_concurrency: usize,
    pub directive_keywords: Vec<String>,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        Self {
            collection: "articles".to_string(),
            dimension: 1_024,
            distance: Distance::Cosine,
            id_strategy: ChunkIdStrategy::Random,
            embed_concurrency: 1,
            directive_keywords: vec!["import".to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub collection: String,
    pub top_k: usize,
    pub query_instruction: String,
    pub context_fields: Vec<String>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            collection: "articles".to_string(),
            top_k: 10,
            query_instruction: "Represent this sentence for searching relevant passages: "
                .to_string(),
            context_fields: vec![
                "title".to_string(),
                SLUG_FIELD.to_string(),
                CONTENT_FIELD.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
    pub generate_model: String,
    pub num_ctx: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "mxbai-embed-large".to_string(),
            generate_model: "gemma3:12b-it-qat".to_string(),
            num_ctx: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub slug: Option<String>,
    pub chunk_count: usize,
    pub stored: usize,
    /// Ordinals of chunks the embedding service returned no vector for.
    pub skipped: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct FolderReport {
    pub documents: Vec<IndexReport>,
    pub skipped_files: Vec<SkippedDocument>,
}

impl FolderReport {
    pub fn stored(&self) -> usize {
        self.documents.iter().map(|report| report.stored).sum()
    }
}

#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub response: String,
    pub hits: Vec<ScoredPoint>,
}
