//! Rendering of retrieved passages and the augmented prompt sent to the generator.

use crate::chunking::normalize_whitespace;
use crate::models::ScoredPoint;
use serde_json::Value;
use std::fmt;

/// Retrieved context plus the user's question, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedPrompt {
    pub retrieved_context: String,
    pub original_query: String,
}

impl AugmentedPrompt {
    pub fn new(retrieved_context: impl Into<String>, original_query: impl Into<String>) -> Self {
        Self {
            retrieved_context: retrieved_context.into(),
            original_query: original_query.into(),
        }
    }

    /// The prompt string handed to the generator.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AugmentedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            concat!(
                "The following are relevant passages:\n",
                "<retrieved-data>\n",
                "{context}\n",
                "</retrieved-data>\n",
                "\n",
                "Here's the original user prompt, answer with help of the retrieved passages:\n",
                "<user-prompt>\n",
                "{query}\n",
                "</user-prompt>\n"
            ),
            context = self.retrieved_context,
            query = self.original_query,
        )
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => normalize_whitespace(text),
        other => other.to_string(),
    }
}

/// One line per hit: `- field: value -- field: value`.
///
/// Only `fields` present in the payload are shown; a payload with none of
/// them is rendered in full so every hit still gets its line.
pub fn render_context<S: AsRef<str>>(hits: &[ScoredPoint], fields: &[S]) -> String {
    hits.iter()
        .map(|hit| {
            let mut parts: Vec<String> = fields
                .iter()
                .filter_map(|field| {
                    let field = field.as_ref();
                    hit.payload
                        .get(field)
                        .map(|value| format!("{field}: {}", render_value(value)))
                })
                .collect();

            if parts.is_empty() {
                parts = hit
                    .payload
                    .iter()
                    .map(|(field, value)| format!("{field}: {}", render_value(value)))
                    .collect();
            }

            format!("- {}", parts.join(" -- "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metadata;
    use serde_json::json;

    fn hit(score: f64, payload: Value) -> ScoredPoint {
        let payload: Metadata = payload.as_object().cloned().unwrap_or_default();
        ScoredPoint {
            id: format!("id-{score}"),
            score,
            payload,
        }
    }

    #[test]
    fn context_has_one_line_per_hit_with_attribution() {
        let hits = vec![
            hit(0.9, json!({"title": "Foo", "slug": "foo", "content": "# Intro\nFoo is great.\n"})),
            hit(0.5, json!({"title": "Bar", "content": "Bar."})),
        ];

        let context = render_context(&hits, &["title", "slug", "content"]);
        assert_eq!(
            context,
            "- title: Foo -- slug: foo -- content: # Intro Foo is great.\n- title: Bar -- content: Bar."
        );
    }

    #[test]
    fn payload_without_known_fields_is_rendered_in_full() {
        let hits = vec![hit(0.3, json!({"text": "My name is Max", "rank": 2}))];
        let context = render_context(&hits, &["title"]);
        assert_eq!(context, "- text: My name is Max -- rank: 2");
    }

    #[test]
    fn no_hits_render_an_empty_block() {
        assert_eq!(render_context::<&str>(&[], &["content"]), "");
    }

    #[test]
    fn prompt_wraps_context_and_query_in_sections() {
        let prompt = AugmentedPrompt::new("- content: Foo is great.", "What is Foo?").render();

        assert!(prompt.contains("<retrieved-data>\n- content: Foo is great.\n</retrieved-data>"));
        assert!(prompt.contains("<user-prompt>\nWhat is Foo?\n</user-prompt>"));
        assert!(prompt.starts_with("The following are relevant passages:"));
    }

    #[test]
    fn render_keeps_the_query_verbatim() {
        let prompt = AugmentedPrompt::new("", "  What is <Foo>?\n");
        let rendered = prompt.render();
        assert_eq!(rendered, prompt.to_string());
        assert!(rendered.contains("<user-prompt>\n  What is <Foo>?\n\n</user-prompt>"));
    }
}
