//! Prompt Normalizer module
//!
//! Cleans raw questions before they reach the parser.
//!
//! Responsibilities:
//! - Reject empty prompts
//! - Correct common misspellings and expand abbreviations
//! - Normalize math symbols to the operators recognizers expect
//! - Capitalize sentence starts
//!
//! Every applied rule is recorded so callers can explain what changed.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

const DEFAULT_SPELLING: [(&str, &str); 13] = [
    ("wether", "weather"),
    ("wheather", "weather"),
    ("temprature", "temperature"),
    ("tempurature", "temperature"),
    ("calcualte", "calculate"),
    ("convertion", "conversion"),
    ("currancy", "currency"),
    ("curreny", "currency"),
    ("dollers", "dollars"),
    ("euros", "EUR"),
    ("whats", "what is"),
    ("wat is", "what is"),
    ("wht is", "what is"),
];

const DEFAULT_ABBREVIATIONS: [(&str, &str); 5] = [
    ("avg", "average"),
    ("temp", "temperature"),
    ("calc", "calculate"),
    ("curr", "currency"),
    ("conv", "convert"),
];

static TIMES_SIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*[x×]\s*(\d+(?:\.\d+)?)").expect("valid times pattern")
});

/// Normalization errors
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("empty prompt")]
    EmptyPrompt,

    #[error("invalid correction pattern '{0}'")]
    InvalidPattern(String),
}

/// Which normalization passes run, plus extra correction entries
#[derive(Debug, Clone)]
pub struct NormalizerOptions {
    pub spelling: bool,
    pub abbreviations: bool,
    pub math_symbols: bool,
    pub sentence_case: bool,
    pub extra_spelling: Vec<(String, String)>,
    pub extra_abbreviations: Vec<(String, String)>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            spelling: true,
            abbreviations: true,
            math_symbols: true,
            sentence_case: true,
            extra_spelling: Vec::new(),
            extra_abbreviations: Vec::new(),
        }
    }
}

/// Result of normalizing one prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPrompt {
    pub original: String,
    pub text: String,
    pub transformations: Vec<String>,
}

impl NormalizedPrompt {
    pub fn changed(&self) -> bool {
        self.original.trim() != self.text
    }
}

struct WordRule {
    pattern: Regex,
    from: String,
    to: String,
}

impl WordRule {
    fn new(from: &str, to: &str) -> Result<Self, NormalizeError> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(from.trim())))
            .map_err(|_| NormalizeError::InvalidPattern(from.to_string()))?;
        Ok(Self {
            pattern,
            from: from.trim().to_string(),
            to: to.to_string(),
        })
    }

    fn apply(&self, text: &str, kind: &str, log: &mut Vec<String>) -> String {
        if !self.pattern.is_match(text) {
            return text.to_string();
        }
        log.push(format!("{}: {} -> {}", kind, self.from, self.to));
        self.pattern
            .replace_all(text, NoExpand(&self.to))
            .into_owned()
    }
}

fn build_rules(
    defaults: &[(&str, &str)],
    extra: &[(String, String)],
) -> Result<Vec<WordRule>, NormalizeError> {
    let defaults = defaults.iter().map(|(from, to)| WordRule::new(from, to));
    let extra = extra
        .iter()
        .filter(|(from, _)| !from.trim().is_empty())
        .map(|(from, to)| WordRule::new(from, to));
    defaults.chain(extra).collect()
}

/// Prompt normalizer
pub struct PromptNormalizer {
    options: NormalizerOptions,
    spelling: Vec<WordRule>,
    abbreviations: Vec<WordRule>,
}

impl PromptNormalizer {
    pub fn new(options: NormalizerOptions) -> Result<Self, NormalizeError> {
        let spelling = build_rules(&DEFAULT_SPELLING, &options.extra_spelling)?;
        let abbreviations =
            build_rules(&DEFAULT_ABBREVIATIONS, &options.extra_abbreviations)?;
        Ok(Self {
            options,
            spelling,
            abbreviations,
        })
    }

    /// Normalize a raw prompt
    pub fn normalize(&self, raw: &str) -> Result<NormalizedPrompt, NormalizeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NormalizeError::EmptyPrompt);
        }

        let mut transformations = Vec::new();
        let mut text = trimmed.to_string();

        if self.options.spelling {
            for rule in &self.spelling {
                text = rule.apply(&text, "spelling", &mut transformations);
            }
        }

        if self.options.abbreviations {
            for rule in &self.abbreviations {
                text = rule.apply(&text, "abbreviation", &mut transformations);
            }
        }

        if self.options.math_symbols {
            let replaced = normalize_math_symbols(&text);
            if replaced != text {
                transformations.push("math symbols".to_string());
                text = replaced;
            }
        }

        if self.options.sentence_case {
            let cased = sentence_case(&text);
            if cased != text {
                transformations.push("sentence case".to_string());
                text = cased;
            }
        }

        if !transformations.is_empty() {
            debug!(
                original = trimmed,
                normalized = %text,
                applied = transformations.len(),
                "prompt normalized"
            );
        }

        Ok(NormalizedPrompt {
            original: raw.to_string(),
            text,
            transformations,
        })
    }
}

impl Default for PromptNormalizer {
    fn default() -> Self {
        // built-in tables are escaped literals and always compile
        Self {
            options: NormalizerOptions::default(),
            spelling: build_rules(&DEFAULT_SPELLING, &[]).unwrap_or_default(),
            abbreviations: build_rules(&DEFAULT_ABBREVIATIONS, &[]).unwrap_or_default(),
        }
    }
}

fn normalize_math_symbols(text: &str) -> String {
    TIMES_SIGN
        .replace_all(text, "${1} * ${2}")
        .replace('÷', "/")
        .replace('−', "-")
}

fn sentence_case(text: &str) -> String {
    text.split(". ")
        .map(|sentence| {
            let mut chars = sentence.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(text: &str) -> NormalizedPrompt {
        PromptNormalizer::default()
            .normalize(text)
            .expect("normalize")
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let normalizer = PromptNormalizer::default();
        assert!(matches!(
            normalizer.normalize("   "),
            Err(NormalizeError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_spelling_is_word_bounded() {
        let result = normalize("whats the wether in Paris");
        assert_eq!(result.text, "What is the weather in Paris");
        assert!(result
            .transformations
            .contains(&"spelling: wether -> weather".to_string()));

        assert_eq!(normalize("is the water cold").text, "Is the water cold");
    }

    #[test]
    fn test_abbreviations_expand() {
        let result = normalize("avg temp in London");
        assert_eq!(result.text, "Average temperature in London");

        // no expansion inside longer words
        assert_eq!(normalize("temple visit").text, "Temple visit");
    }

    #[test]
    fn test_math_symbols() {
        assert_eq!(normalize("what is 3 x 4").text, "What is 3 * 4");
        assert_eq!(normalize("8 ÷ 2").text, "8 / 2");
        assert_eq!(normalize("9 − 3").text, "9 - 3");
    }

    #[test]
    fn test_sentence_case_per_sentence() {
        assert_eq!(normalize("hello. how are you").text, "Hello. How are you");
    }

    #[test]
    fn test_passes_can_be_disabled() {
        let normalizer = PromptNormalizer::new(NormalizerOptions {
            spelling: false,
            abbreviations: false,
            math_symbols: false,
            sentence_case: false,
            ..NormalizerOptions::default()
        })
        .expect("normalizer");
        let result = normalizer.normalize("  avg wether 3 x 4 ").expect("normalize");
        assert_eq!(result.text, "avg wether 3 x 4");
        assert!(result.transformations.is_empty());
        assert!(!result.changed());
    }

    #[test]
    fn test_extra_corrections() {
        let normalizer = PromptNormalizer::new(NormalizerOptions {
            extra_spelling: vec![("plz".to_string(), "please".to_string())],
            ..NormalizerOptions::default()
        })
        .expect("normalizer");
        let result = normalizer.normalize("plz add 2 and 3").expect("normalize");
        assert_eq!(result.text, "Please add 2 and 3");
    }

    #[test]
    fn test_unmatched_text_unchanged() {
        let result = normalize("Gibberish xyz 123");
        assert_eq!(result.text, "Gibberish xyz 123");
        assert!(result.transformations.is_empty());
    }
}
