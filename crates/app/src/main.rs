use anyhow::{bail, Context};
use article_rag_core::{
    ChunkIdStrategy, IndexingOptions, IndexingPipeline, OllamaConfig, OllamaEmbedder,
    OllamaGenerator, QdrantStore, QueryOptions, QueryPipeline, DEFAULT_EMBEDDING_DIMENSIONS,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "article-rag", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Qdrant base URL
    #[arg(long, env = "QDRANT_URL", default_value = "http://localhost:6333")]
    qdrant_url: String,

    /// Qdrant collection holding the article chunks
    #[arg(long, env = "RAG_COLLECTION", default_value = "articles")]
    collection: String,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
    ollama_url: String,

    /// Embedding model served by Ollama
    #[arg(long, env = "RAG_EMBED_MODEL", default_value = "mxbai-embed-large")]
    embed_model: String,

    /// Generation model served by Ollama
    #[arg(long, env = "RAG_GENERATE_MODEL", default_value = "gemma3:12b-it-qat")]
    generate_model: String,

    /// Context window passed to the generation model
    #[arg(long, env = "RAG_NUM_CTX", default_value = "10000")]
    num_ctx: u32,

    /// Output dimension of the embedding model
    #[arg(long, env = "RAG_DIMENSION", default_value_t = DEFAULT_EMBEDDING_DIMENSIONS)]
    dimension: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk, embed and store every article below a folder.
    Ingest {
        /// Folder that contains articles recursively.
        #[arg(long)]
        folder: PathBuf,
        /// File extensions to ingest (repeatable).
        #[arg(long = "extension", default_values = ["mdx", "md"])]
        extensions: Vec<String>,
        /// Derive chunk ids from slug and position so re-ingesting overwrites.
        #[arg(long, default_value_t = false)]
        deterministic_ids: bool,
        /// Chunks embedded and stored concurrently.
        #[arg(long, default_value = "1")]
        concurrency: usize,
    },
    /// Answer a question using retrieved article chunks.
    Ask {
        /// Question; read from stdin when omitted.
        #[arg(long)]
        query: Option<String>,
        /// Number of chunks to retrieve.
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
    /// Print the chunks that would be used to answer a question.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
        /// Number of chunks to retrieve.
        #[arg(long, default_value = "10")]
        top_k: usize,
    },
}

impl Cli {
    fn ollama(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            embed_model: self.embed_model.clone(),
            generate_model: self.generate_model.clone(),
            num_ctx: self.num_ctx,
        }
    }
}

async fn prompt_for_query() -> anyhow::Result<String> {
    print!("Enter a prompt: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("failed to read prompt from stdin")?;
    Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let ollama = cli.ollama();

    let embedder = Arc::new(OllamaEmbedder::new(&ollama)?);
    let store = Arc::new(QdrantStore::new(&cli.qdrant_url)?);

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        qdrant = %cli.qdrant_url,
        collection = %cli.collection,
        "article-rag boot"
    );

    match cli.command {
        Command::Ingest {
            folder,
            extensions,
            deterministic_ids,
            concurrency,
        } => {
            let options = IndexingOptions {
                collection: cli.collection.clone(),
                dimension: cli.dimension,
                id_strategy: if deterministic_ids {
                    ChunkIdStrategy::Deterministic
                } else {
                    ChunkIdStrategy::Random
                },
                embed_concurrency: concurrency,
                ..IndexingOptions::default()
            };
            let pipeline = IndexingPipeline::new(embedder, store, options)?;

            if pipeline.ensure_collection().await? {
                info!(collection = %cli.collection, "collection created");
            }

            let report = pipeline
                .index_folder(&folder, &extensions)
                .await
                .with_context(|| format!("ingestion of {} failed", folder.display()))?;

            for skipped in &report.skipped_files {
                warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
            }
            let skipped_chunks: usize = report.documents.iter().map(|doc| doc.skipped.len()).sum();

            println!(
                "{} chunks stored from {} documents ({} chunks without embedding, {} files skipped) at {}",
                report.stored(),
                report.documents.len(),
                skipped_chunks,
                report.skipped_files.len(),
                Utc::now().to_rfc3339()
            );
        }
        Command::Ask { query, top_k } => {
            let query = match query {
                Some(query) => query,
                None => prompt_for_query().await?,
            };
            if query.trim().is_empty() {
                bail!("no prompt given");
            }

            let generator = Arc::new(OllamaGenerator::new(&ollama)?);
            let pipeline = QueryPipeline::new(
                embedder,
                store,
                generator,
                QueryOptions {
                    collection: cli.collection.clone(),
                    top_k,
                    ..QueryOptions::default()
                },
            )?;

            let answer = pipeline.answer(&query).await?;
            info!(hits = answer.hits.len(), "answer generated");
            println!("{}", answer.response);
        }
        Command::Search { query, top_k } => {
            let generator = Arc::new(OllamaGenerator::new(&ollama)?);
            let pipeline = QueryPipeline::new(
                embedder,
                store,
                generator,
                QueryOptions {
                    collection: cli.collection.clone(),
                    top_k,
                    ..QueryOptions::default()
                },
            )?;

            let hits = pipeline.retrieve(&query).await?;
            println!("query: {query}");
            for hit in &hits {
                println!(
                    "[{}] score={:.4} slug={} title={}",
                    hit.id,
                    hit.score,
                    hit.payload_str("slug").unwrap_or("-"),
                    hit.payload_str("title").unwrap_or("-"),
                );
                if let Some(content) = hit.payload_str("content") {
                    println!("  content:\n{content}");
                }
            }
        }
    }

    Ok(())
}
