//! Plan type definitions

use std::fmt;

use serde::Serialize;

use super::Step;

/// Closed set of intents a plan can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Only the first step is executed and its result formatted
    SingleTool,
    /// Steps run in order, wired together through result bindings
    MultiStep,
    /// Zero steps: the description goes to the generator; one step: it is executed as-is
    GenerationRequired,
    Unknown,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleTool => "single_tool",
            Self::MultiStep => "multi_step",
            Self::GenerationRequired => "generation_required",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan - the compiled form of one question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub kind: IntentKind,
    pub steps: Vec<Step>,
    pub description: String,
    pub confidence: f64,
}

impl Plan {
    pub fn new(kind: IntentKind, steps: Vec<Step>, description: impl Into<String>) -> Self {
        Self {
            kind,
            steps,
            description: description.into(),
            confidence: 1.0,
        }
    }

    pub fn single_tool(step: Step, description: impl Into<String>) -> Self {
        Self::new(IntentKind::SingleTool, vec![step], description)
    }

    pub fn multi_step(steps: Vec<Step>, description: impl Into<String>) -> Self {
        Self::new(IntentKind::MultiStep, steps, description)
    }

    /// Zero-step generation request; the description is the prompt.
    pub fn generation(description: impl Into<String>) -> Self {
        Self::new(IntentKind::GenerationRequired, Vec::new(), description)
    }

    /// Generation request carrying one prepared step.
    pub fn generation_step(step: Step, description: impl Into<String>) -> Self {
        Self::new(IntentKind::GenerationRequired, vec![step], description)
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
