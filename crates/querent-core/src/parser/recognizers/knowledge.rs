use std::sync::LazyLock;

use regex::Regex;

use crate::parser::patterns::{any_match, capture, compile};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{Plan, Step};

static WHO_IS: LazyLock<Regex> = LazyLock::new(|| compile(r"who\s+is\s+([a-z\s]+)\??"));
static WHAT_IS: LazyLock<Regex> = LazyLock::new(|| compile(r"what\s+is\s+([a-z\s]+)\??"));
static TELL_ME: LazyLock<Regex> =
    LazyLock::new(|| compile(r"tell\s+me\s+about\s+([a-z\s]+)\??"));

/// Fact lookups against the knowledge base
pub struct KnowledgeRecognizer;

impl Recognizer for KnowledgeRecognizer {
    fn name(&self) -> &str {
        "knowledge_base"
    }

    fn priority(&self) -> i32 {
        6
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        any_match(&[&WHO_IS, &WHAT_IS, &TELL_ME], &text)
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();
        let caps = WHO_IS
            .captures(&text)
            .or_else(|| WHAT_IS.captures(&text))
            .or_else(|| TELL_ME.captures(&text))
            .ok_or(RecognizeError::NoRule)?;
        let subject = capture(&caps, 1).ok_or(RecognizeError::Missing("subject"))?;
        let description = format!("Look up {}", subject);
        Ok(Plan::single_tool(
            Step::new(names::KNOWLEDGE_BASE, "kb_lookup")
                .with_param("query", subject)
                .with_description(description.clone()),
            description,
        ))
    }
}
