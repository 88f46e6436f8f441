use crate::error::IngestError;
use regex::Regex;

const TAG_PATTERN: &str = r"<[^>]+>";

/// Strips directive lines and markup tags from a document body.
#[derive(Debug, Clone)]
pub struct ContentCleaner {
    directive_re: Option<Regex>,
    tag_re: Regex,
}

impl ContentCleaner {
    /// Lines starting with any of `keywords` followed by a space or tab are removed.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, IngestError> {
        let alternatives = keywords
            .iter()
            .map(|keyword| keyword.as_ref().trim())
            .filter(|keyword| !keyword.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>();

        let directive_re = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?m)^(?:{})[ \t][^\n]*\n?",
                alternatives.join("|")
            ))?)
        };

        Ok(Self {
            directive_re,
            tag_re: Regex::new(TAG_PATTERN)?,
        })
    }

    /// Cleans `text`; `clean(clean(x)) == clean(x)` for every input.
    pub fn clean(&self, text: &str) -> String {
        let mut current = self.pass(text);
        loop {
            let next = self.pass(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn pass(&self, text: &str) -> String {
        let without_directives = match &self.directive_re {
            Some(re) => re.replace_all(text, ""),
            None => text.into(),
        };
        self.tag_re
            .replace_all(&without_directives, "")
            .trim()
            .to_string()
    }
}

pub fn clean_content(text: &str) -> Result<String, IngestError> {
    Ok(ContentCleaner::new(&["import"])?.clean(text))
}
