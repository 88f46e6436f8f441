use crate::models::{QueryAnswer, QueryOptions, ScoredPoint};
use crate::prompt::{render_context, AugmentedPrompt};
use crate::traits::{EmbeddingClient, GenerationClient, VectorStore};
use crate::{IngestError, PipelineError, ServiceError};
use std::sync::Arc;
use tracing::{debug, info};

/// Embeds a question, retrieves the nearest chunks and asks the generator
/// to answer with those chunks as context.
pub struct QueryPipeline<E, V, G> {
    embedder: Arc<E>,
    store: Arc<V>,
    generator: Arc<G>,
    options: QueryOptions,
}

impl<E, V, G> QueryPipeline<E, V, G>
where
    E: EmbeddingClient + Send + Sync,
    V: VectorStore + Send + Sync,
    G: GenerationClient + Send + Sync,
{
    pub fn new(
        embedder: Arc<E>,
        store: Arc<V>,
        generator: Arc<G>,
        options: QueryOptions,
    ) -> Result<Self, IngestError> {
        if options.top_k == 0 {
            return Err(IngestError::InvalidArgument(
                "top_k must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            store,
            generator,
            options,
        })
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The text actually embedded for `query`: queries and passages are
    /// embedded differently.
    pub fn instruct(&self, query: &str) -> String {
        format!("{}{}", self.options.query_instruction, query)
    }

    /// Nearest chunks for `query`, best first, at most `top_k`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredPoint>, PipelineError> {
        if query.trim().is_empty() {
            return Err(IngestError::InvalidArgument("query is empty".to_string()).into());
        }

        let vector = self
            .embedder
            .embed(&self.instruct(query))
            .await?
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty())
            .ok_or_else(|| {
                ServiceError::backend(self.embedder.model(), "no embedding returned for query")
            })?;

        let mut hits = self
            .store
            .query(&self.options.collection, &vector, self.options.top_k, true)
            .await?;

        hits.sort_by(|left, right| right.score.total_cmp(&left.score));
        hits.truncate(self.options.top_k);

        debug!(
            collection = %self.options.collection,
            hits = hits.len(),
            "retrieved chunks"
        );
        Ok(hits)
    }

    pub fn render_context(&self, hits: &[ScoredPoint]) -> String {
        render_context(hits, &self.options.context_fields)
    }

    pub fn augment(&self, query: &str, hits: &[ScoredPoint]) -> AugmentedPrompt {
        AugmentedPrompt::new(self.render_context(hits), query)
    }

    pub async fn answer(&self, query: &str) -> Result<QueryAnswer, PipelineError> {
        let hits = self.retrieve(query).await?;
        let prompt = self.augment(query, &hits);

        info!(
            hits = hits.len(),
            model = self.generator.model(),
            "generating answer"
        );
        let response = self.generator.generate(&prompt.render()).await?;

        Ok(QueryAnswer { response, hits })
    }
}
