//! Text generation contract
//!
//! The generator answers prompts no recognizer could compile, and backs the
//! `llm` tool used by summarization plans.

use async_trait::async_trait;
use thiserror::Error;

/// Text generator trait
#[async_trait]
pub trait Generator: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}
