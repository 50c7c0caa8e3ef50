//! Executor module
//!
//! The engine is responsible for:
//! - Picking the execution strategy for a plan
//! - Resolving `${name}` references against a per-run variable scope
//! - Calling tool adapters one step at a time, in order

mod strategy;
mod substitution;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::generation::{GenerationError, Generator};
use crate::tool::{ToolError, ToolRegistry};
use crate::types::{IntentKind, Plan, Step, ToolValue};

pub use strategy::{
    default_strategies, ExecutionStrategy, GenerationStrategy, MultiStepStrategy,
    SingleToolStrategy, UnknownIntentStrategy,
};
pub use substitution::{is_amount_like, resolve_parameters, AMOUNT_LIKE_PARAMETERS};

/// Width of question, description and result previews in logs.
pub const LOG_PREVIEW_CHARS: usize = 240;

/// One-line preview of `text` for a log field.
///
/// Line breaks become spaces; past `max_chars` the tail is replaced by a
/// count of the dropped chars.
pub fn log_preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    let multiline = text.contains(['\n', '\r']);
    if total <= max_chars && !multiline {
        return Cow::Borrowed(text);
    }
    let mut preview: String = text
        .chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if total > max_chars {
        preview.push_str(&format!(" [+{} chars]", total - max_chars));
    }
    Cow::Owned(preview)
}

/// Execution errors
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("operation '{operation}' not found on tool '{tool}'")]
    OperationNotFound { tool: String, operation: String },

    #[error("unbound variable '${{{0}}}'")]
    UnboundVariable(String),

    #[error("tool '{tool}.{operation}' failed: {source}")]
    ToolFailure {
        tool: String,
        operation: String,
        #[source]
        source: ToolError,
    },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("{0} plan has no steps")]
    EmptyPlan(IntentKind),

    #[error("no execution strategy for plan kind {0}")]
    NoStrategy(IntentKind),
}

/// Stable category of an execution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ToolNotFound,
    OperationNotFound,
    SubstitutionUnboundVariable,
    ToolExecutionFailure,
    GenerationFailure,
    EmptyPlan,
    NoStrategyForPlanKind,
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolNotFound(_) => ErrorKind::ToolNotFound,
            Self::OperationNotFound { .. } => ErrorKind::OperationNotFound,
            Self::UnboundVariable(_) => ErrorKind::SubstitutionUnboundVariable,
            Self::ToolFailure { .. } => ErrorKind::ToolExecutionFailure,
            Self::Generation(_) => ErrorKind::GenerationFailure,
            Self::EmptyPlan(_) => ErrorKind::EmptyPlan,
            Self::NoStrategy(_) => ErrorKind::NoStrategyForPlanKind,
        }
    }
}

/// Named intermediate results of one plan run
#[derive(Debug, Default)]
pub struct VariableScope {
    bindings: HashMap<String, ToolValue>,
}

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, overwriting any earlier binding of the same name
    pub fn bind(&mut self, name: impl Into<String>, value: ToolValue) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ToolValue> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Record of one executed step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub index: usize,
    pub tool: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    pub result: ToolValue,
    pub elapsed_ms: u64,
}

/// State owned by a single `Engine::execute` call
#[derive(Debug, Default)]
pub struct ExecutionRun {
    pub scope: VariableScope,
    pub records: Vec<StepRecord>,
}

impl ExecutionRun {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of interpreting a plan
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub value: ToolValue,
    pub strategy: String,
    pub steps: Vec<StepRecord>,
}

impl ExecutionOutcome {
    /// Final answer text
    pub fn answer(&self) -> String {
        self.value.render()
    }
}

/// Plan interpreter
pub struct Engine {
    tools: ToolRegistry,
    strategies: Vec<Box<dyn ExecutionStrategy>>,
    generator: Arc<dyn Generator>,
}

impl Engine {
    /// Create an engine with the default strategy set
    pub fn new(tools: ToolRegistry, generator: Arc<dyn Generator>) -> Self {
        Self::with_strategies(tools, generator, default_strategies())
    }

    /// Create an engine with an explicit, ordered strategy list
    pub fn with_strategies(
        tools: ToolRegistry,
        generator: Arc<dyn Generator>,
        strategies: Vec<Box<dyn ExecutionStrategy>>,
    ) -> Self {
        Self {
            tools,
            strategies,
            generator,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    /// Interpret a plan with a fresh variable scope
    pub async fn execute(&self, plan: &Plan) -> Result<ExecutionOutcome, ExecutionError> {
        let strategy = self
            .strategies
            .iter()
            .find(|strategy| strategy.can_handle(plan))
            .ok_or(ExecutionError::NoStrategy(plan.kind))?;

        info!(
            kind = %plan.kind,
            strategy = strategy.name(),
            steps = plan.steps.len(),
            description = %log_preview(&plan.description, LOG_PREVIEW_CHARS),
            "plan execution started"
        );

        let mut run = ExecutionRun::new();
        match strategy.execute(plan, self, &mut run).await {
            Ok(value) => {
                info!(
                    strategy = strategy.name(),
                    steps_run = run.records.len(),
                    result = %log_preview(&value.render(), LOG_PREVIEW_CHARS),
                    "plan execution completed"
                );
                Ok(ExecutionOutcome {
                    value,
                    strategy: strategy.name().to_string(),
                    steps: run.records,
                })
            }
            Err(err) => {
                warn!(
                    strategy = strategy.name(),
                    steps_run = run.records.len(),
                    error_kind = ?err.kind(),
                    error = %err,
                    "plan execution failed"
                );
                Err(err)
            }
        }
    }

    /// Resolve and run one step, recording it in the run
    pub async fn execute_step(
        &self,
        index: usize,
        step: &Step,
        run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError> {
        let adapter = self
            .tools
            .get(&step.tool)
            .ok_or_else(|| ExecutionError::ToolNotFound(step.tool.clone()))?;
        if !adapter.has_operation(&step.operation) {
            return Err(ExecutionError::OperationNotFound {
                tool: step.tool.clone(),
                operation: step.operation.clone(),
            });
        }

        let params = resolve_parameters(&step.parameters, &run.scope)?;
        debug!(
            step = index,
            tool = %step.tool,
            operation = %step.operation,
            params = ?params,
            "step parameters resolved"
        );

        let started = Instant::now();
        info!(
            step = index,
            tool = %step.tool,
            operation = %step.operation,
            "step execution started"
        );
        let value = adapter.execute(&step.operation, params).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            step = index,
            tool = %step.tool,
            operation = %step.operation,
            elapsed_ms,
            result = %log_preview(&value.render(), LOG_PREVIEW_CHARS),
            "step execution completed"
        );

        run.records.push(StepRecord {
            index,
            tool: step.tool.clone(),
            operation: step.operation.clone(),
            binding: step.result_binding.clone(),
            result: value.clone(),
            elapsed_ms,
        });
        Ok(value)
    }
}
