use crate::models::{Distance, IndexedPoint, Metadata, ScoredPoint};
use crate::traits::VectorStore;
use crate::ServiceError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

struct Collection {
    dimension: usize,
    distance: Distance,
    points: Vec<IndexedPoint>,
}

/// Brute-force, process-local vector store. Writes are visible to the next
/// query as soon as `upsert` returns, so every write is durable in the
/// store's sense.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn point_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|stored| stored.points.len())
            .unwrap_or(0)
    }
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot = left.iter().zip(right).map(|(a, b)| a * b).sum::<f32>();
    let left_norm = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_norm = right.iter().map(|value| value * value).sum::<f32>().sqrt();

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm * right_norm)
}

fn check_dimension(expected: usize, actual: usize) -> Result<(), ServiceError> {
    if expected != actual {
        return Err(ServiceError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, ServiceError> {
        Ok(self.collections.read().await.contains_key(collection))
    }

    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, ServiceError> {
        Ok(self
            .collections
            .read()
            .await
            .get(collection)
            .map(|stored| stored.dimension))
    }

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), ServiceError> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(collection) {
            return Err(ServiceError::backend(
                "memory",
                format!("collection {collection} already exists"),
            ));
        }

        collections.insert(
            collection.to_string(),
            Collection {
                dimension,
                distance,
                points: Vec::new(),
            },
        );
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        point: IndexedPoint,
        _durable: bool,
    ) -> Result<(), ServiceError> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| ServiceError::UnknownCollection(collection.to_string()))?;
        check_dimension(stored.dimension, point.vector.len())?;

        match stored.points.iter_mut().find(|existing| existing.id == point.id) {
            Some(existing) => *existing = point,
            None => stored.points.push(point),
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>, ServiceError> {
        let collections = self.collections.read().await;
        let stored = collections
            .get(collection)
            .ok_or_else(|| ServiceError::UnknownCollection(collection.to_string()))?;
        check_dimension(stored.dimension, vector.len())?;

        let mut scored: Vec<ScoredPoint> = stored
            .points
            .iter()
            .map(|point| ScoredPoint {
                id: point.id.clone(),
                score: match stored.distance {
                    Distance::Cosine => f64::from(cosine_similarity(vector, &point.vector)),
                },
                payload: if with_payload {
                    point.payload.clone()
                } else {
                    Metadata::new()
                },
            })
            .collect();

        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}
