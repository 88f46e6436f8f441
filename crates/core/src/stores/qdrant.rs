use crate::endpoint::{join_endpoint, push_segments};
use crate::models::{Distance, IndexedPoint, Metadata, ScoredPoint};
use crate::traits::VectorStore;
use crate::ServiceError;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

/// Vector store backed by the Qdrant REST API.
pub struct QdrantStore {
    endpoint: Url,
    client: Client,
}

impl QdrantStore {
    pub fn new(endpoint: &str) -> Result<Self, ServiceError> {
        Ok(Self {
            endpoint: join_endpoint(endpoint, "")?,
            client: Client::new(),
        })
    }

    fn collection_url(&self, collection: &str, rest: &[&str]) -> Result<Url, ServiceError> {
        let mut segments = vec!["collections", collection];
        segments.extend_from_slice(rest);
        push_segments(&self.endpoint, &segments)
    }
}

fn distance_name(distance: Distance) -> &'static str {
    match distance {
        Distance::Cosine => "Cosine",
    }
}

async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::backend("qdrant", format!("{status}: {body}")))
}

fn parse_vector_size(parsed: &Value) -> Result<usize, ServiceError> {
    parsed
        .pointer("/result/config/params/vectors/size")
        .and_then(Value::as_u64)
        .map(|size| size as usize)
        .ok_or_else(|| {
            ServiceError::backend("qdrant", "collection info has no single unnamed vector size")
        })
}

fn parse_scored_points(parsed: &Value) -> Result<Vec<ScoredPoint>, ServiceError> {
    let hits = parsed
        .pointer("/result/points")
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::backend("qdrant", "query response has no result.points"))?;

    let mut result = Vec::with_capacity(hits.len());
    for hit in hits {
        let id = match hit.pointer("/id") {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };
        let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
        let payload = hit
            .pointer("/payload")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_else(Metadata::new);

        result.push(ScoredPoint { id, score, payload });
    }

    Ok(result)
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn collection_exists(&self, collection: &str) -> Result<bool, ServiceError> {
        let response = self
            .client
            .get(self.collection_url(collection, &["exists"])?)
            .send()
            .await?;

        let parsed: Value = ensure_success(response).await?.json().await?;
        parsed
            .pointer("/result/exists")
            .and_then(Value::as_bool)
            .ok_or_else(|| ServiceError::backend("qdrant", "exists response has no result.exists"))
    }

    async fn collection_dimension(&self, collection: &str) -> Result<Option<usize>, ServiceError> {
        let response = self
            .client
            .get(self.collection_url(collection, &[])?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let parsed: Value = ensure_success(response).await?.json().await?;
        parse_vector_size(&parsed).map(Some)
    }

    async fn create_collection(
        &self,
        collection: &str,
        dimension: usize,
        distance: Distance,
    ) -> Result<(), ServiceError> {
        let response = self
            .client
            .put(self.collection_url(collection, &[])?)
            .json(&json!({
                "vectors": {
                    "size": dimension,
                    "distance": distance_name(distance),
                }
            }))
            .send()
            .await?;

        ensure_success(response).await?;
        debug!(collection, dimension, "qdrant collection created");
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        point: IndexedPoint,
        durable: bool,
    ) -> Result<(), ServiceError> {
        let mut url = self.collection_url(collection, &["points"])?;
        url.query_pairs_mut()
            .append_pair("wait", if durable { "true" } else { "false" });

        let response = self
            .client
            .put(url)
            .json(&json!({
                "points": [{
                    "id": point.id,
                    "vector": point.vector,
                    "payload": point.payload,
                }]
            }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
        with_payload: bool,
    ) -> Result<Vec<ScoredPoint>, ServiceError> {
        let response = self
            .client
            .post(self.collection_url(collection, &["points", "query"])?)
            .json(&json!({
                "query": vector,
                "limit": top_k,
                "with_payload": with_payload,
            }))
            .send()
            .await?;

        let parsed: Value = ensure_success(response).await?.json().await?;
        parse_scored_points(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_response_is_parsed_in_order() -> Result<(), ServiceError> {
        let parsed = json!({
            "result": {
                "points": [
                    {
                        "id": "3f1c3a4e-8a44-4a58-9d0e-0c3f2b7e9a11",
                        "version": 1,
                        "score": 0.91,
                        "payload": { "title": "Foo", "content": "# Intro\nFoo is great.\n" }
                    },
                    { "id": 7, "version": 1, "score": 0.42 }
                ]
            },
            "status": "ok",
            "time": 0.001
        });

        let points = parse_scored_points(&parsed)?;
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "3f1c3a4e-8a44-4a58-9d0e-0c3f2b7e9a11");
        assert_eq!(points[0].payload_str("title"), Some("Foo"));
        assert_eq!(points[1].id, "7");
        assert!(points[1].payload.is_empty());
        assert!(points[0].score > points[1].score);
        Ok(())
    }

    #[test]
    fn malformed_query_response_is_an_error() {
        let parsed = json!({ "status": { "error": "Not found: Collection `x` doesn't exist!" } });
        assert!(parse_scored_points(&parsed).is_err());
    }

    #[test]
    fn endpoint_trailing_slash_is_ignored() -> Result<(), ServiceError> {
        for endpoint in ["http://localhost:6333", "http://localhost:6333/"] {
            let store = QdrantStore::new(endpoint)?;
            assert_eq!(
                store.collection_url("articles", &[])?.as_str(),
                "http://localhost:6333/collections/articles"
            );
        }
        Ok(())
    }

    #[test]
    fn collection_names_are_percent_encoded() -> Result<(), ServiceError> {
        let store = QdrantStore::new("http://localhost:6333")?;
        let url = store.collection_url("blog posts/2024", &["points", "query"])?;
        assert_eq!(
            url.as_str(),
            "http://localhost:6333/collections/blog%20posts%2F2024/points/query"
        );
        Ok(())
    }

    #[test]
    fn vector_size_is_read_from_collection_info() -> Result<(), ServiceError> {
        let parsed = json!({
            "result": {
                "status": "green",
                "config": { "params": { "vectors": { "size": 1024, "distance": "Cosine" } } }
            },
            "status": "ok"
        });
        assert_eq!(parse_vector_size(&parsed)?, 1024);

        let named = json!({
            "result": { "config": { "params": { "vectors": { "text": { "size": 384 } } } } }
        });
        assert!(parse_vector_size(&named).is_err());
        Ok(())
    }
}
