use crate::models::Metadata;
use tracing::warn;

/// A line consisting of exactly this marker opens and closes the frontmatter block.
pub const DELIMITER: &str = "---";

/// Splits raw document text into its frontmatter metadata and body.
///
/// Text with fewer than two delimiter lines is returned untouched with empty
/// metadata. A block that is not a YAML mapping is logged and dropped; the
/// body is still returned. Delimiter lines after the second one are part of
/// the body.
pub fn extract_frontmatter(raw: &str) -> (Metadata, String) {
    let parts = split_on_delimiter_lines(raw);
    if parts.len() < 3 {
        return (Metadata::new(), raw.to_string());
    }

    let separator = format!("\n{DELIMITER}\n");
    let body = parts[2..].join(separator.as_str()).trim().to_string();

    match parse_metadata(&parts[1]) {
        Ok(metadata) => (metadata, body),
        Err(error) => {
            warn!(error = %error, "malformed frontmatter, continuing without metadata");
            (Metadata::new(), body)
        }
    }
}

fn split_on_delimiter_lines(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in raw.split('\n') {
        if line.trim_end() == DELIMITER {
            parts.push(current.join("\n"));
            current.clear();
        } else {
            current.push(line);
        }
    }
    parts.push(current.join("\n"));

    parts
}

fn parse_metadata(block: &str) -> Result<Metadata, serde_yaml::Error> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    Ok(serde_yaml::from_str::<Option<Metadata>>(block)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_without_delimiters_is_unchanged() {
        let raw = "# Title\n\nSome prose.\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn unclosed_block_is_not_frontmatter() {
        let raw = "---\ntitle: Foo\n# Intro\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn frontmatter_is_parsed_and_body_trimmed() {
        let raw = "---\ntitle: Foo\n---\n# Intro\nFoo is great.\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert_eq!(metadata.get("title"), Some(&json!("Foo")));
        assert_eq!(body, "# Intro\nFoo is great.");
    }

    #[test]
    fn key_order_and_sequences_are_preserved() {
        let raw = "---\ntitle: Foo\ntags:\n  - rust\n  - rag\ndraft: false\n---\nbody";
        let (metadata, _) = extract_frontmatter(raw);
        let keys: Vec<&str> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "tags", "draft"]);
        assert_eq!(metadata["tags"], json!(["rust", "rag"]));
        assert_eq!(metadata["draft"], json!(false));
    }

    #[test]
    fn later_delimiters_stay_in_the_body() {
        let raw = "---\ntitle: Foo\n---\nabove\n---\nbelow\n";
        let (_, body) = extract_frontmatter(raw);
        assert_eq!(body, "above\n---\nbelow");
    }

    #[test]
    fn inline_hyphens_are_not_delimiters() {
        let raw = "a --- b\n--- not a delimiter\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, raw);
    }

    #[test]
    fn malformed_yaml_degrades_to_empty_metadata() {
        let raw = "---\ntitle: [unclosed\n---\n# Intro\ntext\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, "# Intro\ntext");
    }

    #[test]
    fn non_mapping_block_degrades_to_empty_metadata() {
        let raw = "---\njust a sentence\n---\nbody\n";
        let (metadata, body) = extract_frontmatter(raw);
        assert!(metadata.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn empty_block_yields_empty_metadata() {
        let (metadata, body) = extract_frontmatter("---\n---\nbody");
        assert!(metadata.is_empty());
        assert_eq!(body, "body");
    }

    #[test]
    fn crlf_delimiters_are_recognized() {
        let (metadata, body) = extract_frontmatter("---\r\ntitle: Foo\r\n---\r\nbody\r\n");
        assert_eq!(metadata["title"], json!("Foo"));
        assert_eq!(body, "body");
    }
}
