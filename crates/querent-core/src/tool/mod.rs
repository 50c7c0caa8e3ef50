//! Tool abstraction module
//!
//! This module defines the tool boundary the engine calls through:
//! - Tool: a named bundle of operations (calculator, weather, ...)
//! - ToolInput: resolved parameters handed to a tool
//! - ToolAdapter: uniform `execute(operation, params)` wrapper around a tool
//! - ToolRegistry: name -> adapter lookup, read-only after startup

mod adapter;
mod input;
mod registry;

use async_trait::async_trait;
use thiserror::Error;

pub use adapter::{parse_unit_reading, GenerationAdapter, StandardAdapter, ToolAdapter, UnitValueAdapter};
pub use input::ToolInput;
pub use registry::ToolRegistry;

use crate::types::ToolValue;

/// Well-known tool names used by the built-in recognizers.
pub mod names {
    pub const CALCULATOR: &str = "calculator";
    pub const WEATHER: &str = "weather";
    pub const CURRENCY: &str = "currency";
    pub const KNOWLEDGE_BASE: &str = "knowledge_base";
    pub const LLM: &str = "llm";
}

/// Tool trait - a named set of callable operations
///
/// Tools are black boxes to the engine. They receive fully resolved
/// parameters and return a typed value or fail.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must be unique within a registry)
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Operation names this tool answers to
    fn operations(&self) -> &[&'static str];

    async fn call(&self, operation: &str, input: ToolInput) -> Result<ToolValue, ToolError>;
}

/// Tool-level errors
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing parameter '{0}'")]
    MissingParameter(String),
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("unsupported operation '{0}'")]
    UnsupportedOperation(String),
    #[error("{0}")]
    Failed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
