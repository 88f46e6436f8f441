use crate::endpoint::join_endpoint;
use crate::models::OllamaConfig;
use crate::traits::EmbeddingClient;
use crate::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1_024;

#[derive(Debug, Clone, Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

/// Embedding client for an Ollama server's `/api/embed` endpoint.
pub struct OllamaEmbedder {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::new(),
            endpoint: join_endpoint(&config.base_url, "api/embed")?,
            model: config.embed_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbedder {
    async fn embed(&self, input: &str) -> Result<Vec<Vec<f32>>, ServiceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({
                "model": self.model,
                "input": input,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::backend(
                "ollama",
                format!("embed returned {}", response.status()),
            ));
        }

        let parsed: EmbedResponse = response.json().await?;
        Ok(parsed.embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Offline embedder hashing character trigrams into a fixed number of buckets.
#[derive(Debug, Clone, Copy)]
pub struct HashingEmbedder {
    pub dimensions: usize,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashingEmbedder {
    /// L2-normalized trigram histogram; `None` for blank input.
    pub fn vector(&self, text: &str) -> Option<Vec<f32>> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        let mut vector = vec![0f32; self.dimensions.max(1)];
        let padded: Vec<char> = format!("  {lowered} ").chars().collect();

        for window in padded.windows(3) {
            let mut hash = 1469598103934665603u64;
            for ch in window {
                let mut buffer = [0u8; 4];
                for byte in ch.encode_utf8(&mut buffer).bytes() {
                    hash ^= byte as u64;
                    hash = hash.wrapping_mul(1099511628211);
                }
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Some(vector)
    }
}

#[async_trait]
impl EmbeddingClient for HashingEmbedder {
    async fn embed(&self, input: &str) -> Result<Vec<Vec<f32>>, ServiceError> {
        Ok(self.vector(input).into_iter().collect())
    }

    fn model(&self) -> &str {
        "trigram-hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_response_reads_vectors() -> Result<(), serde_json::Error> {
        let parsed: EmbedResponse = serde_json::from_str(
            r#"{"model":"mxbai-embed-large","embeddings":[[0.5,-0.25,1.0]]}"#,
        )?;
        assert_eq!(parsed.embeddings, vec![vec![0.5, -0.25, 1.0]]);
        Ok(())
    }

    #[test]
    fn embed_response_without_vectors_is_empty() -> Result<(), serde_json::Error> {
        let parsed: EmbedResponse = serde_json::from_str(r#"{"model":"mxbai-embed-large"}"#)?;
        assert!(parsed.embeddings.is_empty());
        Ok(())
    }

    #[test]
    fn ollama_embedder_targets_embed_endpoint() -> Result<(), ServiceError> {
        let embedder = OllamaEmbedder::new(&OllamaConfig::default())?;
        assert_eq!(embedder.endpoint.as_str(), "http://localhost:11434/api/embed");
        assert_eq!(embedder.model(), "mxbai-embed-large");
        Ok(())
    }

    #[test]
    fn hashing_embedder_is_deterministic() {
        let embedder = HashingEmbedder::default();
        let first = embedder.vector("Hydraulic pressure and flow");
        let second = embedder.vector("Hydraulic pressure and flow");
        assert_eq!(first, second);
    }

    #[test]
    fn hashing_embedder_outputs_expected_length() {
        let embedder = HashingEmbedder { dimensions: 32 };
        let vector = embedder.vector("abc").unwrap_or_default();
        assert_eq!(vector.len(), 32);
        let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn hashing_embedder_returns_nothing_for_blank_input() -> Result<(), ServiceError> {
        let embedder = HashingEmbedder::default();
        assert!(embedder.embed("   ").await?.is_empty());
        assert_eq!(embedder.embed("text").await?.len(), 1);
        Ok(())
    }
}
