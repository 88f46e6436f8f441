use crate::models::{Chunk, ChunkIdStrategy, Document, CONTENT_FIELD};
use serde_json::Value;
use uuid::Uuid;

pub const HEADING_MARKER: char = '#';

pub const CODE_FENCE: &str = "```";

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits cleaned body text into heading-aligned sections.
///
/// Paragraphs are separated by blank lines. A paragraph whose first line
/// starts with [`HEADING_MARKER`] closes the section being accumulated and
/// opens a new one; every other paragraph is appended to the open section.
/// Each kept line ends in a single `\n`. Paragraphs inside a fenced code
/// block never open a section, so `# comment` lines in shell or Python
/// snippets stay with their heading. Text before the first heading becomes a
/// section of its own, without a heading line.
pub fn chunk_by_heading(cleaned: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Option<String> = None;
    let mut in_fence = false;

    for paragraph in cleaned.split("\n\n") {
        let paragraph = paragraph.trim_matches('\n');
        if paragraph.is_empty() {
            continue;
        }

        if !in_fence && paragraph.starts_with(HEADING_MARKER) {
            if let Some(done) = current.take() {
                chunks.push(done);
            }
        }

        let section = current.get_or_insert_with(String::new);
        for line in paragraph.split('\n') {
            if line.trim_start().starts_with(CODE_FENCE) {
                in_fence = !in_fence;
            }
            section.push_str(line);
            section.push('\n');
        }
    }

    if let Some(done) = current {
        chunks.push(done);
    }

    chunks
}

/// Turns a document's cleaned body into indexable chunks.
///
/// Blank sections are dropped; ordinals keep the section's position in the
/// document so gaps show where a section was dropped.
pub fn build_chunks(document: &Document, cleaned: &str, strategy: ChunkIdStrategy) -> Vec<Chunk> {
    let key = document.slug().unwrap_or(&document.source_path);

    chunk_by_heading(cleaned)
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(position, text)| {
            let ordinal = position as u64;
            let mut metadata = document.metadata.clone();
            metadata.insert(CONTENT_FIELD.to_string(), Value::String(text.clone()));

            Chunk {
                id: make_chunk_id(strategy, key, ordinal),
                ordinal,
                text,
                metadata,
            }
        })
        .collect()
}

fn make_chunk_id(strategy: ChunkIdStrategy, key: &str, ordinal: u64) -> String {
    match strategy {
        ChunkIdStrategy::Random => Uuid::new_v4().to_string(),
        ChunkIdStrategy::Deterministic => {
            let name = format!("{key}#{ordinal}");
            Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
        }
    }
}
