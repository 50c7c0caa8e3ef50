//! Tool adapters
//!
//! Adapters give every tool the same `execute(operation, params)` shape and
//! normalize results on the way out. The unit adapter is the only place a
//! dual-typed value is created.

use std::sync::Arc;

use async_trait::async_trait;

use super::{names, Tool, ToolInput};
use crate::executor::ExecutionError;
use crate::generation::Generator;
use crate::types::{Parameters, ToolValue};

/// Uniform boundary between the engine and a tool
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    fn name(&self) -> &str;

    fn operations(&self) -> Vec<String>;

    fn has_operation(&self, operation: &str) -> bool {
        self.operations().iter().any(|op| op == operation)
    }

    /// Run one operation with already-resolved parameters
    async fn execute(&self, operation: &str, params: Parameters) -> Result<ToolValue, ExecutionError>;
}

async fn call_tool(
    tool: &dyn Tool,
    operation: &str,
    params: Parameters,
) -> Result<ToolValue, ExecutionError> {
    if !tool.operations().iter().any(|op| *op == operation) {
        return Err(ExecutionError::OperationNotFound {
            tool: tool.name().to_string(),
            operation: operation.to_string(),
        });
    }
    tool.call(operation, ToolInput::new(params))
        .await
        .map_err(|source| ExecutionError::ToolFailure {
            tool: tool.name().to_string(),
            operation: operation.to_string(),
            source,
        })
}

/// Pass-through adapter
pub struct StandardAdapter {
    tool: Arc<dyn Tool>,
}

impl StandardAdapter {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

#[async_trait]
impl ToolAdapter for StandardAdapter {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn operations(&self) -> Vec<String> {
        self.tool.operations().iter().map(|op| op.to_string()).collect()
    }

    async fn execute(&self, operation: &str, params: Parameters) -> Result<ToolValue, ExecutionError> {
        call_tool(self.tool.as_ref(), operation, params).await
    }
}

/// Adapter that turns unit-suffixed readings (`"18°C"`) into dual values
pub struct UnitValueAdapter {
    tool: Arc<dyn Tool>,
    unit: String,
}

impl UnitValueAdapter {
    pub fn new(tool: Arc<dyn Tool>, unit: impl Into<String>) -> Self {
        Self {
            tool,
            unit: unit.into(),
        }
    }
}

/// Numeric part of a reading like `"18°C"`, when the text carries `unit`.
pub fn parse_unit_reading(text: &str, unit: &str) -> Option<f64> {
    if unit.is_empty() || !text.contains(unit) {
        return None;
    }
    text.replace(unit, "").trim().parse().ok()
}

#[async_trait]
impl ToolAdapter for UnitValueAdapter {
    fn name(&self) -> &str {
        self.tool.name()
    }

    fn operations(&self) -> Vec<String> {
        self.tool.operations().iter().map(|op| op.to_string()).collect()
    }

    async fn execute(&self, operation: &str, params: Parameters) -> Result<ToolValue, ExecutionError> {
        let value = call_tool(self.tool.as_ref(), operation, params).await?;
        Ok(match value {
            ToolValue::Text(text) => match parse_unit_reading(&text, &self.unit) {
                Some(numeric) => ToolValue::dual(text, numeric),
                None => ToolValue::Text(text),
            },
            other => other,
        })
    }
}

const GENERATION_OPERATIONS: [&str; 2] = ["generate", "llm_fallback"];

/// Exposes the text generator as the `llm` tool
pub struct GenerationAdapter {
    generator: Arc<dyn Generator>,
}

impl GenerationAdapter {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl ToolAdapter for GenerationAdapter {
    fn name(&self) -> &str {
        names::LLM
    }

    fn operations(&self) -> Vec<String> {
        GENERATION_OPERATIONS.iter().map(|op| op.to_string()).collect()
    }

    async fn execute(&self, operation: &str, params: Parameters) -> Result<ToolValue, ExecutionError> {
        if !GENERATION_OPERATIONS.iter().any(|op| *op == operation) {
            return Err(ExecutionError::OperationNotFound {
                tool: names::LLM.to_string(),
                operation: operation.to_string(),
            });
        }
        let input = ToolInput::new(params);
        let prompt = input
            .text("prompt")
            .map_err(|source| ExecutionError::ToolFailure {
                tool: names::LLM.to_string(),
                operation: operation.to_string(),
                source,
            })?;
        let answer = self.generator.generate(&prompt).await?;
        Ok(ToolValue::Text(answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::tool::ToolError;

    struct ReadingTool {
        reading: &'static str,
    }

    #[async_trait]
    impl Tool for ReadingTool {
        fn name(&self) -> &str {
            "weather"
        }

        fn operations(&self) -> &[&'static str] {
            &["get_weather"]
        }

        async fn call(&self, _operation: &str, _input: ToolInput) -> Result<ToolValue, ToolError> {
            Ok(ToolValue::Text(self.reading.to_string()))
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("echo: {}", prompt))
        }
    }

    #[test]
    fn test_parse_unit_reading() {
        assert_eq!(parse_unit_reading("18°C", "°C"), Some(18.0));
        assert_eq!(parse_unit_reading(" 19.5 °C", "°C"), Some(19.5));
        assert_eq!(parse_unit_reading("sunny °C", "°C"), None);
        assert_eq!(parse_unit_reading("18", "°C"), None);
    }

    #[tokio::test]
    async fn test_unit_adapter_produces_dual_value() {
        let adapter = UnitValueAdapter::new(Arc::new(ReadingTool { reading: "18°C" }), "°C");
        let value = adapter
            .execute("get_weather", Parameters::new())
            .await
            .expect("execute");
        assert_eq!(value, ToolValue::dual("18°C", 18.0));
    }

    #[tokio::test]
    async fn test_unit_adapter_passes_through_text_without_unit() {
        let adapter = UnitValueAdapter::new(Arc::new(ReadingTool { reading: "cloudy" }), "°C");
        let value = adapter
            .execute("get_weather", Parameters::new())
            .await
            .expect("execute");
        assert_eq!(value, ToolValue::Text("cloudy".to_string()));
    }

    #[tokio::test]
    async fn test_standard_adapter_rejects_unknown_operation() {
        let adapter = StandardAdapter::new(Arc::new(ReadingTool { reading: "18°C" }));
        let err = adapter
            .execute("forecast", Parameters::new())
            .await
            .expect_err("unknown operation");
        assert!(matches!(
            err,
            ExecutionError::OperationNotFound { ref tool, ref operation }
                if tool == "weather" && operation == "forecast"
        ));
    }

    #[tokio::test]
    async fn test_generation_adapter_forwards_prompt() {
        let adapter = GenerationAdapter::new(Arc::new(EchoGenerator));
        assert!(adapter.has_operation("llm_fallback"));
        let params: Parameters = vec![("prompt", "Summarize 18°C")].into_iter().collect();
        let value = adapter.execute("generate", params).await.expect("generate");
        assert_eq!(value, ToolValue::Text("echo: Summarize 18°C".to_string()));
    }
}
