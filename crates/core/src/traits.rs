use crate::models::{Distance, IndexedPoint, ScoredPoint};
use crate::ServiceError;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingClient {
    /// Returns zero or more embeddings for `input`; callers use the first one.
    async fn embed(&self, input: &str) -> Result<Vec<Vec<f32>>, ServiceError>;

    fn model(&self) -> &str;
}

#[async_trait]
pub trait GenerationClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;

    fn model(&self) -> &str;
}

#[async_trait]
pub trait VectorStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, ServiceError>;

    /// Vector dimension of an existing collection; `None` if it does not exist.
    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, ServiceError>;

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), ServiceError>;

    /// With `durable` set, returns only once the store has acknowledged the write.
    async fn upsert(
        &self,
        collection: &str,
        point: IndexedPoint,
        durable: bool,
    ) -> Result<(), ServiceError>;

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>, ServiceError>;
}
