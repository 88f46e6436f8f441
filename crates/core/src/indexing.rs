use crate::chunking::build_chunks;
use crate::cleaner::ContentCleaner;
use crate::ingest::{discover_documents, load_document};
use crate::models::{
    Chunk, Document, FolderReport, IndexReport, IndexedPoint, IndexingOptions, SkippedDocument,
};
use crate::traits::{EmbeddingClient, VectorStore};
use crate::{IngestError, PipelineError, ServiceError};
use futures::{stream, StreamExt, TryStreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

enum ChunkOutcome {
    Stored,
    Skipped(u64),
}

/// Cleans, chunks, embeds and stores documents in one vector collection.
///
/// Embedding and upsert run per chunk, up to `embed_concurrency` chunks at a
/// time. A chunk the embedding service returns no vector for is skipped and
/// reported; any service error aborts the invocation without rolling back
/// points that were already stored.
pub struct IndexingPipeline<E, V> {
    embedder: Arc<E>,
    store: Arc<V>,
    cleaner: ContentCleaner,
    options: IndexingOptions,
}

impl<E, V> IndexingPipeline<E, V>
where
    E: EmbeddingClient + Send + Sync,
    V: VectorStore + Send + Sync,
{
    pub fn new(embedder: Arc<E>, store: Arc<V>, options: IndexingOptions) -> Result<Self, IngestError> {
        if options.embed_concurrency == 0 {
            return Err(IngestError::InvalidArgument(
                "embed_concurrency must be at least 1".to_string(),
            ));
        }
        if options.dimension == 0 {
            return Err(IngestError::InvalidArgument(
                "vector dimension must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            embedder,
            store,
            cleaner: ContentCleaner::new(&options.directive_keywords)?,
            options,
        })
    }

    pub fn options(&self) -> &IndexingOptions {
        &self.options
    }

    /// Creates the collection if it is missing. Returns whether it was created.
    ///
    /// An existing collection must have the configured vector dimension.
    pub async fn ensure_collection(&self) -> Result<bool, ServiceError> {
        let collection = &self.options.collection;
        match self.store.collection_dimension(collection).await? {
            Some(existing) if existing == self.options.dimension => return Ok(false),
            Some(existing) => {
                return Err(ServiceError::DimensionMismatch {
                    expected: existing,
                    actual: self.options.dimension,
                })
            }
            None => {}
        }

        self.store
            .create_collection(collection, self.options.dimension, self.options.distance)
            .await?;
        info!(
            collection = %collection,
            dimension = self.options.dimension,
            "created vector collection"
        );
        Ok(true)
    }

    /// Clean + chunk only; no service is contacted.
    pub fn prepare(&self, document: &Document) -> Vec<Chunk> {
        let cleaned = self.cleaner.clean(&document.body);
        build_chunks(document, &cleaned, self.options.id_strategy)
    }

    pub async fn index_document(&self, document: &Document) -> Result<IndexReport, PipelineError> {
        let chunks = self.prepare(document);
        let chunk_count = chunks.len();
        let slug = document.slug().map(str::to_string);

        let outcomes: Vec<ChunkOutcome> = stream::iter(chunks)
            .map(|chunk| self.index_chunk(slug.as_deref(), chunk))
            .buffer_unordered(self.options.embed_concurrency)
            .try_collect()
            .await?;

        let mut skipped: Vec<u64> = outcomes
            .iter()
            .filter_map(|outcome| match outcome {
                ChunkOutcome::Skipped(ordinal) => Some(*ordinal),
                ChunkOutcome::Stored => None,
            })
            .collect();
        skipped.sort_unstable();

        let report = IndexReport {
            slug,
            chunk_count,
            stored: chunk_count - skipped.len(),
            skipped,
        };

        info!(
            source = %document.source_path,
            chunks = report.chunk_count,
            stored = report.stored,
            skipped = report.skipped.len(),
            "indexed document"
        );
        Ok(report)
    }

    async fn index_chunk(&self, slug: Option<&str>, chunk: Chunk) -> Result<ChunkOutcome, ServiceError> {
        let vector = self
            .embedder
            .embed(&chunk.text)
            .await?
            .into_iter()
            .next()
            .filter(|vector| !vector.is_empty());

        let Some(vector) = vector else {
            warn!(
                slug = slug.unwrap_or_default(),
                ordinal = chunk.ordinal,
                model = self.embedder.model(),
                "embedding service returned no vector, chunk not indexed"
            );
            return Ok(ChunkOutcome::Skipped(chunk.ordinal));
        };

        let point = IndexedPoint {
            id: chunk.id,
            vector,
            payload: chunk.metadata,
        };
        debug!(id = %point.id, ordinal = chunk.ordinal, "upserting chunk");
        self.store
            .upsert(&self.options.collection, point, true)
            .await?;

        Ok(ChunkOutcome::Stored)
    }

    pub async fn index_path(&self, path: &Path) -> Result<IndexReport, PipelineError> {
        let document = load_document(path)?;
        self.index_document(&document).await
    }

    /// Indexes every matching file below `folder`.
    ///
    /// Files that cannot be read or named are skipped and reported; service
    /// failures stop the whole run.
    pub async fn index_folder<S: AsRef<str>>(
        &self,
        folder: &Path,
        extensions: &[S],
    ) -> Result<FolderReport, PipelineError> {
        let files = discover_documents(folder, extensions);
        if files.is_empty() {
            return Err(IngestError::NoDocuments(folder.display().to_string()).into());
        }

        let mut report = FolderReport::default();
        for path in files {
            match load_document(&path) {
                Ok(document) => report.documents.push(self.index_document(&document).await?),
                Err(error) => {
                    warn!(path = %path.display(), reason = %error, "skipped document");
                    report.skipped_files.push(SkippedDocument {
                        path,
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }
}
