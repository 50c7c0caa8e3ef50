//! # Querent Runtime
//!
//! Wires the core pipeline to concrete tools and generators:
//! - `Orchestrator`: normalize → parse → execute, with a generation fallback
//! - Generators: offline placeholder, HTTP chat completions, fallback chain
//! - Bootstrap: config-driven construction and tracing setup

pub mod bootstrap;
pub mod generator;
pub mod orchestrator;

pub use bootstrap::{build_orchestrator, normalizer_options, BootstrapError, RuntimeApp};
pub use generator::{
    build_generator, placeholder_answer, ChatCompletionsConfig, ChatCompletionsGenerator,
    FallbackGenerator, OfflineGenerator,
};
pub use orchestrator::{Answer, AnswerSource, Explanation, Orchestrator};
