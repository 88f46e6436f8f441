use crate::endpoint::join_endpoint;
use crate::models::OllamaConfig;
use crate::traits::GenerationClient;
use crate::ServiceError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct GenerateOptions {
    num_ctx: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Non-streaming client for an Ollama server's `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: Client,
    endpoint: Url,
    model: String,
    num_ctx: u32,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::new(),
            endpoint: join_endpoint(&config.base_url, "api/generate")?,
            model: config.generate_model.clone(),
            num_ctx: config.num_ctx,
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_ctx: self.num_ctx,
            },
        }
    }
}

#[async_trait]
impl GenerationClient for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&self.request(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::backend(
                "ollama",
                format!("generate returned {}", response.status()),
            ));
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .response
            .ok_or_else(|| ServiceError::backend("ollama", "generate response has no `response` field"))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_disables_streaming_and_sets_context_window() -> Result<(), ServiceError> {
        let generator = OllamaGenerator::new(&OllamaConfig::default())?;
        let body = serde_json::to_value(generator.request("hello"))?;

        assert_eq!(
            body,
            json!({
                "model": "gemma3:12b-it-qat",
                "prompt": "hello",
                "stream": false,
                "options": { "num_ctx": 10000 }
            })
        );
        assert_eq!(generator.endpoint.as_str(), "http://localhost:11434/api/generate");
        Ok(())
    }

    #[test]
    fn response_text_is_read_verbatim() -> Result<(), serde_json::Error> {
        let parsed: GenerateResponse =
            serde_json::from_str(r#"{"model":"m","response":"  Foo is great.\n","done":true}"#)?;
        assert_eq!(parsed.response.as_deref(), Some("  Foo is great.\n"));
        Ok(())
    }
}
