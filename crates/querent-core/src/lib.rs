//! # Querent Core
//!
//! Core abstractions and deterministic logic for Querent.
//!
//! This crate contains:
//! - Plan / Step / value definitions
//! - The recognizer registry that turns cleaned text into a Plan
//! - The execution engine that interprets a Plan against tool adapters
//! - The prompt normalizer applied before parsing
//!
//! This crate does NOT care about:
//! - How tools compute their answers
//! - Which text generator backs the fallback
//! - How answers are displayed

pub mod executor;
pub mod generation;
pub mod normalizer;
pub mod parser;
pub mod tool;
pub mod types;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::executor::{
        default_strategies, Engine, ErrorKind, ExecutionError, ExecutionOutcome, ExecutionRun,
        ExecutionStrategy, StepRecord, VariableScope,
    };
    pub use crate::generation::{GenerationError, Generator};
    pub use crate::normalizer::{
        NormalizeError, NormalizedPrompt, NormalizerOptions, PromptNormalizer,
    };
    pub use crate::parser::{
        AttemptOutcome, ParseOutcome, ParseTrace, QueryParser, RecognizeError, Recognizer,
        RecognizerAttempt,
    };
    pub use crate::tool::{
        GenerationAdapter, StandardAdapter, Tool, ToolAdapter, ToolError, ToolInput,
        ToolRegistry, UnitValueAdapter,
    };
    pub use crate::types::{
        format_number, IntentKind, ParamValue, Parameters, Plan, Step, ToolValue,
    };
}

// Re-export key types at crate root
pub use executor::{Engine, ExecutionError, ExecutionOutcome};
pub use generation::{GenerationError, Generator};
pub use normalizer::{NormalizedPrompt, PromptNormalizer};
pub use parser::{ParseOutcome, ParseTrace, QueryParser};
pub use tool::{Tool, ToolAdapter, ToolRegistry};
pub use types::{IntentKind, ParamValue, Parameters, Plan, Step, ToolValue};
