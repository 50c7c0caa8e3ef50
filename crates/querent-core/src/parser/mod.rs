//! Query parser module
//!
//! The parser owns an ordered list of recognizers. For each question it:
//! - Walks recognizers by descending priority (ties keep registration order)
//! - Asks each matching recognizer to build a plan
//! - Falls back to a zero-step generation plan when none succeeds
//!
//! Parsing never fails; unmatched input is an ordinary outcome.

mod patterns;
pub mod recognizers;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::Plan;

pub use recognizers::default_recognizers;

/// Recognizer-level failures; recorded in the trace, never surfaced
#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("no parse rule applied")]
    NoRule,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),

    #[error("missing {0}")]
    Missing(&'static str),
}

/// Recognizer trait - one family of question shapes
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Higher runs first
    fn priority(&self) -> i32;

    /// Cheap check whether this recognizer should be tried
    fn matches(&self, text: &str) -> bool;

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError>;
}

/// Outcome of one recognizer attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Parsed,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizerAttempt {
    pub recognizer: String,
    pub outcome: AttemptOutcome,
}

/// Which recognizers were tried for one question and which one won
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseTrace {
    pub attempts: Vec<RecognizerAttempt>,
    pub matched: Option<String>,
}

impl ParseTrace {
    /// `name` for a parsed attempt, `name (failed: reason)` otherwise
    pub fn patterns_tried(&self) -> Vec<String> {
        self.attempts
            .iter()
            .map(|attempt| match &attempt.outcome {
                AttemptOutcome::Parsed => attempt.recognizer.clone(),
                AttemptOutcome::Failed { reason } => {
                    format!("{} (failed: {})", attempt.recognizer, reason)
                }
            })
            .collect()
    }

    pub fn is_fallback(&self) -> bool {
        self.matched.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub plan: Plan,
    pub trace: ParseTrace,
}

/// Priority-ordered recognizer registry
pub struct QueryParser {
    recognizers: Vec<Box<dyn Recognizer>>,
}

impl QueryParser {
    /// Create a parser with no recognizers
    pub fn new() -> Self {
        Self {
            recognizers: Vec::new(),
        }
    }

    /// Create a parser with the built-in recognizer set
    pub fn with_default_recognizers() -> Self {
        let mut parser = Self::new();
        for recognizer in default_recognizers() {
            parser.register(recognizer);
        }
        parser
    }

    /// Register a recognizer; the list stays sorted by descending priority
    pub fn register(&mut self, recognizer: Box<dyn Recognizer>) {
        self.recognizers.push(recognizer);
        // stable: equal priorities keep registration order
        self.recognizers
            .sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    pub fn recognizer_names(&self) -> Vec<String> {
        self.recognizers
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    /// Compile cleaned text into a plan
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut trace = ParseTrace::default();

        for recognizer in &self.recognizers {
            if !recognizer.matches(text) {
                continue;
            }
            match recognizer.parse(text) {
                Ok(plan) => {
                    debug!(
                        recognizer = recognizer.name(),
                        kind = %plan.kind,
                        steps = plan.steps.len(),
                        "recognizer produced plan"
                    );
                    trace.attempts.push(RecognizerAttempt {
                        recognizer: recognizer.name().to_string(),
                        outcome: AttemptOutcome::Parsed,
                    });
                    trace.matched = Some(recognizer.name().to_string());
                    return ParseOutcome { plan, trace };
                }
                Err(err) => {
                    debug!(
                        recognizer = recognizer.name(),
                        error = %err,
                        "recognizer matched but could not parse"
                    );
                    trace.attempts.push(RecognizerAttempt {
                        recognizer: recognizer.name().to_string(),
                        outcome: AttemptOutcome::Failed {
                            reason: err.to_string(),
                        },
                    });
                }
            }
        }

        debug!(attempts = trace.attempts.len(), "no recognizer applied, delegating to generation");
        ParseOutcome {
            plan: Plan::generation(text).with_confidence(0.0),
            trace,
        }
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::with_default_recognizers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntentKind, Step};

    struct FixedRecognizer {
        name: &'static str,
        priority: i32,
        trigger: &'static str,
        fail: bool,
    }

    impl Recognizer for FixedRecognizer {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn matches(&self, text: &str) -> bool {
            text.contains(self.trigger)
        }

        fn parse(&self, _text: &str) -> Result<Plan, RecognizeError> {
            if self.fail {
                return Err(RecognizeError::NoRule);
            }
            Ok(Plan::single_tool(Step::new(self.name, "run"), self.name))
        }
    }

    fn fixed(name: &'static str, priority: i32, fail: bool) -> Box<dyn Recognizer> {
        Box::new(FixedRecognizer {
            name,
            priority,
            trigger: "foo",
            fail,
        })
    }

    #[test]
    fn test_higher_priority_wins_regardless_of_registration_order() {
        let mut parser = QueryParser::new();
        parser.register(fixed("low", 10, false));
        parser.register(fixed("high", 20, false));

        let outcome = parser.parse("foo");
        assert_eq!(outcome.plan.steps[0].tool, "high");
        assert_eq!(outcome.trace.matched.as_deref(), Some("high"));
        assert_eq!(outcome.trace.patterns_tried(), vec!["high".to_string()]);
    }

    #[test]
    fn test_equal_priority_keeps_registration_order() {
        let mut parser = QueryParser::new();
        parser.register(fixed("first", 5, false));
        parser.register(fixed("second", 5, false));
        assert_eq!(parser.recognizer_names(), vec!["first", "second"]);
        assert_eq!(parser.parse("foo").plan.steps[0].tool, "first");
    }

    #[test]
    fn test_parse_failure_falls_through_to_next_recognizer() {
        let mut parser = QueryParser::new();
        parser.register(fixed("broken", 20, true));
        parser.register(fixed("working", 10, false));

        let outcome = parser.parse("foo");
        assert_eq!(outcome.trace.matched.as_deref(), Some("working"));
        assert_eq!(
            outcome.trace.patterns_tried(),
            vec![
                "broken (failed: no parse rule applied)".to_string(),
                "working".to_string()
            ]
        );
    }

    #[test]
    fn test_unmatched_text_becomes_generation_plan() {
        let mut parser = QueryParser::new();
        parser.register(fixed("only", 1, false));

        let outcome = parser.parse("Gibberish xyz 123");
        assert_eq!(outcome.plan.kind, IntentKind::GenerationRequired);
        assert!(outcome.plan.steps.is_empty());
        assert_eq!(outcome.plan.description, "Gibberish xyz 123");
        assert!(outcome.trace.is_fallback());
        assert!(outcome.trace.attempts.is_empty());
    }

    #[test]
    fn test_empty_parser_always_delegates() {
        let outcome = QueryParser::new().parse("");
        assert_eq!(outcome.plan.kind, IntentKind::GenerationRequired);
    }
}
