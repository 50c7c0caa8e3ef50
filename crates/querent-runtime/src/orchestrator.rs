//! Orchestrator - normalize → parse → execute pipeline with a generation fallback
//!
//! The orchestrator never fails: when the pipeline cannot answer, the
//! generator answers the original question, and when that fails too a
//! placeholder answer is returned.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use querent_core::executor::{log_preview, StepRecord, LOG_PREVIEW_CHARS};
use querent_core::normalizer::NormalizeError;
use querent_core::{Engine, NormalizedPrompt, ParseTrace, Plan, PromptNormalizer, QueryParser};

use crate::generator::placeholder_answer;

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Parsed and executed plan
    Pipeline,
    /// Generator answered after the pipeline failed
    GenerationFallback,
    /// Both the pipeline and the generator failed
    Placeholder,
}

/// Answer to one question, with what the pipeline did to produce it
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query_id: String,
    pub text: String,
    pub source: AnswerSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<NormalizedPrompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<ParseTrace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepRecord>,
    /// Pipeline failure that triggered the fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Parse result for a question, without executing it
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub normalized: NormalizedPrompt,
    pub trace: ParseTrace,
    pub plan: Plan,
}

pub struct Orchestrator {
    normalizer: PromptNormalizer,
    parser: QueryParser,
    engine: Engine,
}

impl Orchestrator {
    /// The engine's generator doubles as the fallback generator.
    pub fn new(normalizer: PromptNormalizer, parser: QueryParser, engine: Engine) -> Self {
        Self {
            normalizer,
            parser,
            engine,
        }
    }

    pub fn parser(&self) -> &QueryParser {
        &self.parser
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Answer text only
    pub async fn process_query(&self, raw: &str) -> String {
        self.answer(raw).await.text
    }

    /// Normalize and parse without executing
    pub fn explain(&self, raw: &str) -> Result<Explanation, NormalizeError> {
        let normalized = self.normalizer.normalize(raw)?;
        let outcome = self.parser.parse(&normalized.text);
        Ok(Explanation {
            normalized,
            trace: outcome.trace,
            plan: outcome.plan,
        })
    }

    pub async fn answer(&self, raw: &str) -> Answer {
        let started = Instant::now();
        let query_id = uuid::Uuid::new_v4().to_string();
        info!(
            query_id = %query_id,
            query = %log_preview(raw, LOG_PREVIEW_CHARS),
            "query received"
        );

        let mut answer = Answer {
            query_id,
            text: String::new(),
            source: AnswerSource::Pipeline,
            normalized: None,
            trace: None,
            plan: None,
            strategy: None,
            steps: Vec::new(),
            error: None,
            elapsed_ms: 0,
        };

        let failure = match self.normalizer.normalize(raw) {
            Ok(normalized) => {
                let outcome = self.parser.parse(&normalized.text);
                debug!(
                    query_id = %answer.query_id,
                    cleaned = %normalized.text,
                    patterns_tried = ?outcome.trace.patterns_tried(),
                    kind = %outcome.plan.kind,
                    "query parsed"
                );
                let result = self.engine.execute(&outcome.plan).await;
                answer.normalized = Some(normalized);
                answer.trace = Some(outcome.trace);
                answer.plan = Some(outcome.plan);
                match result {
                    Ok(execution) => {
                        answer.text = execution.answer();
                        answer.strategy = Some(execution.strategy);
                        answer.steps = execution.steps;
                        None
                    }
                    Err(err) => Some(err.to_string()),
                }
            }
            Err(err) => Some(err.to_string()),
        };

        if let Some(error) = failure {
            let fallback = self.engine.generator();
            warn!(
                query_id = %answer.query_id,
                error = %error,
                generator = fallback.name(),
                "pipeline failed, falling back to generation"
            );
            match fallback.generate(raw).await {
                Ok(text) => {
                    answer.text = text;
                    answer.source = AnswerSource::GenerationFallback;
                }
                Err(fallback_err) => {
                    warn!(
                        query_id = %answer.query_id,
                        error = %fallback_err,
                        "generation fallback failed"
                    );
                    answer.text = placeholder_answer(raw);
                    answer.source = AnswerSource::Placeholder;
                }
            }
            answer.error = Some(error);
        }

        answer.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            query_id = %answer.query_id,
            source = ?answer.source,
            elapsed_ms = answer.elapsed_ms,
            answer = %log_preview(&answer.text, LOG_PREVIEW_CHARS),
            "query answered"
        );
        answer
    }
}
