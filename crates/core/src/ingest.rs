use crate::frontmatter::extract_frontmatter;
use crate::models::{Document, SLUG_FIELD};
use crate::IngestError;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DEFAULT_EXTENSIONS: [&str; 2] = ["mdx", "md"];

pub fn discover_documents<S: AsRef<str>>(folder: &Path, extensions: &[S]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|wanted| ext.eq_ignore_ascii_case(wanted.as_ref()))
            });

        if matches {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

/// Builds a document from raw file text. Metadata comes only from frontmatter.
pub fn parse_document(source_path: impl Into<String>, raw: &str) -> Document {
    let normalized = raw.replace("\r\n", "\n");
    let (metadata, body) = extract_frontmatter(&normalized);

    Document {
        source_path: source_path.into(),
        metadata,
        body,
    }
}

/// Reads and parses one document, tagging it with a `slug` derived from its file name.
pub fn load_document(path: &Path) -> Result<Document, IngestError> {
    let raw = fs::read_to_string(path)?;
    let slug = slug_from_path(path)?;

    let mut document = parse_document(path.to_string_lossy(), &raw);
    document
        .metadata
        .insert(SLUG_FIELD.to_string(), Value::String(slug));
    Ok(document)
}

pub fn slug_from_path(path: &Path) -> Result<String, IngestError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn discover_documents_is_recursive_and_filters_extensions(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("a.mdx")).and_then(|mut file| file.write_all(b"# A"))?;
        File::create(nested.join("b.MD")).and_then(|mut file| file.write_all(b"# B"))?;
        File::create(base.join("notes.txt")).and_then(|mut file| file.write_all(b"skip"))?;

        let files = discover_documents(base, &DEFAULT_EXTENSIONS);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|path| path.extension().is_some()));
        Ok(())
    }

    #[test]
    fn load_document_sets_slug_from_file_stem() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("hello-world.mdx");
        fs::write(&path, "---\ntitle: Hello\nslug: ignored\n---\n# Hi\nthere\n")?;

        let document = load_document(&path)?;
        assert_eq!(document.slug(), Some("hello-world"));
        assert_eq!(document.metadata["title"], "Hello");
        assert_eq!(document.body, "# Hi\nthere");
        Ok(())
    }

    #[test]
    fn windows_line_endings_are_normalized() {
        let document = parse_document("a.md", "---\r\ntitle: A\r\n---\r\n# A\r\n\r\nbody\r\n");
        assert_eq!(document.metadata["title"], "A");
        assert_eq!(document.body, "# A\n\nbody");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_document(Path::new("/definitely/not/here.mdx"));
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
