//! Execution strategies, one per plan kind

use async_trait::async_trait;
use tracing::{debug, info};

use super::{Engine, ExecutionError, ExecutionRun};
use crate::types::{format_number, IntentKind, Plan, ToolValue, TEMPERATURE_UNIT};

/// Interprets plans of the kinds it accepts
#[async_trait]
pub trait ExecutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn can_handle(&self, plan: &Plan) -> bool;

    async fn execute(
        &self,
        plan: &Plan,
        engine: &Engine,
        run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError>;
}

/// Default ordered strategy set; covers every `IntentKind`.
pub fn default_strategies() -> Vec<Box<dyn ExecutionStrategy>> {
    vec![
        Box::new(SingleToolStrategy),
        Box::new(MultiStepStrategy::default()),
        Box::new(GenerationStrategy),
        Box::new(UnknownIntentStrategy),
    ]
}

/// Runs the first step and renders its result
pub struct SingleToolStrategy;

#[async_trait]
impl ExecutionStrategy for SingleToolStrategy {
    fn name(&self) -> &str {
        "single_tool"
    }

    fn can_handle(&self, plan: &Plan) -> bool {
        plan.kind == IntentKind::SingleTool
    }

    async fn execute(
        &self,
        plan: &Plan,
        engine: &Engine,
        run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError> {
        let step = plan
            .first_step()
            .ok_or(ExecutionError::EmptyPlan(plan.kind))?;
        let value = engine.execute_step(0, step, run).await?;
        Ok(ToolValue::Text(value.render()))
    }
}

/// Runs every step in order, threading results through the run scope
pub struct MultiStepStrategy {
    unit: String,
}

impl MultiStepStrategy {
    /// `unit` is re-attached to a bare numeric answer of a temperature plan
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

impl Default for MultiStepStrategy {
    fn default() -> Self {
        Self::new(TEMPERATURE_UNIT)
    }
}

fn mentions_temperature(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("temperature") || lower.contains("weather")
}

fn is_temperature_plan(plan: &Plan) -> bool {
    mentions_temperature(&plan.description)
        || plan
            .steps
            .iter()
            .any(|step| mentions_temperature(&step.description))
}

#[async_trait]
impl ExecutionStrategy for MultiStepStrategy {
    fn name(&self) -> &str {
        "multi_step"
    }

    fn can_handle(&self, plan: &Plan) -> bool {
        plan.kind == IntentKind::MultiStep
    }

    async fn execute(
        &self,
        plan: &Plan,
        engine: &Engine,
        run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError> {
        let temperature_plan = is_temperature_plan(plan);
        let mut last = None;

        for (index, step) in plan.steps.iter().enumerate() {
            let value = engine.execute_step(index, step, run).await?;
            if let Some(binding) = &step.result_binding {
                info!(
                    step = index,
                    binding = %binding,
                    value = %value,
                    "stored step result"
                );
                run.scope.bind(binding.clone(), value.clone());
            }
            last = Some(value);
        }

        let last = last.ok_or(ExecutionError::EmptyPlan(plan.kind))?;
        match last {
            ToolValue::Number(n) if temperature_plan => {
                debug!(unit = %self.unit, "re-attaching unit to numeric result");
                Ok(ToolValue::Text(format!("{}{}", format_number(n), self.unit)))
            }
            other => Ok(other),
        }
    }
}

/// Hands the plan to the generator, or runs its single prepared step
pub struct GenerationStrategy;

#[async_trait]
impl ExecutionStrategy for GenerationStrategy {
    fn name(&self) -> &str {
        "generation"
    }

    fn can_handle(&self, plan: &Plan) -> bool {
        plan.kind == IntentKind::GenerationRequired
    }

    async fn execute(
        &self,
        plan: &Plan,
        engine: &Engine,
        run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError> {
        match plan.first_step() {
            None => {
                info!(generator = engine.generator().name(), "delegating plan to generator");
                let answer = engine.generator().generate(&plan.description).await?;
                Ok(ToolValue::Text(answer))
            }
            Some(step) => engine.execute_step(0, step, run).await,
        }
    }
}

/// Treats an unclassified plan as a plain generation request
pub struct UnknownIntentStrategy;

#[async_trait]
impl ExecutionStrategy for UnknownIntentStrategy {
    fn name(&self) -> &str {
        "unknown"
    }

    fn can_handle(&self, plan: &Plan) -> bool {
        plan.kind == IntentKind::Unknown
    }

    async fn execute(
        &self,
        plan: &Plan,
        engine: &Engine,
        _run: &mut ExecutionRun,
    ) -> Result<ToolValue, ExecutionError> {
        let answer = engine.generator().generate(&plan.description).await?;
        Ok(ToolValue::Text(answer))
    }
}
