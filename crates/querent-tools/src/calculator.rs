//! Calculator tool

use async_trait::async_trait;
use thiserror::Error;

use querent_core::tool::{names, Tool, ToolError, ToolInput};
use querent_core::ToolValue;

const OPERATIONS: [&str; 11] = [
    "add",
    "subtract",
    "multiply",
    "divide",
    "percent_of",
    "average",
    "sum",
    "maximum",
    "minimum",
    "power",
    "calculate",
];

#[derive(Debug, Error, PartialEq)]
pub enum CalculatorError {
    #[error("cannot divide by zero")]
    DivisionByZero,
    #[error("cannot calculate {0} of an empty list")]
    EmptyList(&'static str),
    #[error("{0} requires two numbers")]
    MissingOperand(&'static str),
    #[error("unsupported operation '{0}'")]
    InvalidOperation(String),
    #[error("result is not a finite number")]
    NotFinite,
}

impl From<CalculatorError> for ToolError {
    fn from(err: CalculatorError) -> Self {
        ToolError::Failed(err.to_string())
    }
}

pub fn divide(first: f64, second: f64) -> Result<f64, CalculatorError> {
    if second == 0.0 {
        return Err(CalculatorError::DivisionByZero);
    }
    Ok(first / second)
}

pub fn percent_of(percentage: f64, number: f64) -> f64 {
    percentage / 100.0 * number
}

pub fn average(numbers: &[f64]) -> Result<f64, CalculatorError> {
    if numbers.is_empty() {
        return Err(CalculatorError::EmptyList("average"));
    }
    Ok(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

fn extreme(
    numbers: &[f64],
    label: &'static str,
    pick: fn(f64, f64) -> f64,
) -> Result<f64, CalculatorError> {
    numbers
        .iter()
        .copied()
        .reduce(pick)
        .ok_or(CalculatorError::EmptyList(label))
}

/// Dispatch by operation name.
///
/// Binary operations use `first` and `second`; list operations use `numbers`.
pub fn calculate(
    operation: &str,
    first: Option<f64>,
    second: Option<f64>,
    numbers: Option<&[f64]>,
) -> Result<f64, CalculatorError> {
    let operation = operation.trim().to_lowercase();
    let pair = |label: &'static str| match (first, second) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(CalculatorError::MissingOperand(label)),
    };
    let list = numbers.unwrap_or(&[]);

    let result = match operation.as_str() {
        "add" => pair("addition").map(|(a, b)| a + b)?,
        "subtract" => pair("subtraction").map(|(a, b)| a - b)?,
        "multiply" => pair("multiplication").map(|(a, b)| a * b)?,
        "divide" => pair("division").and_then(|(a, b)| divide(a, b))?,
        "percent_of" => pair("percent calculation").map(|(a, b)| percent_of(a, b))?,
        "power" => pair("power calculation").map(|(a, b)| a.powf(b))?,
        "average" => average(list)?,
        "sum" => list.iter().sum(),
        "maximum" => extreme(list, "maximum", f64::max)?,
        "minimum" => extreme(list, "minimum", f64::min)?,
        other => return Err(CalculatorError::InvalidOperation(other.to_string())),
    };

    if !result.is_finite() {
        return Err(CalculatorError::NotFinite);
    }
    Ok(result)
}

/// Arithmetic over literal or resolved numbers
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        names::CALCULATOR
    }

    fn description(&self) -> &str {
        "Arithmetic, percentages and aggregates over numbers"
    }

    fn operations(&self) -> &[&'static str] {
        &OPERATIONS
    }

    async fn call(&self, operation: &str, input: ToolInput) -> Result<ToolValue, ToolError> {
        let result = match operation {
            "percent_of" => calculate(
                operation,
                Some(input.number("percentage")?),
                Some(input.number("number")?),
                None,
            )?,
            "power" => calculate(
                operation,
                Some(input.number("base")?),
                Some(input.number("exponent")?),
                None,
            )?,
            "average" | "sum" | "maximum" | "minimum" => {
                let numbers = input.numbers("numbers")?;
                calculate(operation, None, None, Some(&numbers))?
            }
            "calculate" => {
                let inner = input.text("operation")?;
                let numbers = input.optional_numbers("numbers")?;
                calculate(
                    &inner,
                    input.optional_number("first_number")?,
                    input.optional_number("second_number")?,
                    numbers.as_deref(),
                )?
            }
            _ => calculate(
                operation,
                Some(input.number("first_number")?),
                Some(input.number("second_number")?),
                None,
            )?,
        };
        Ok(ToolValue::Number(result))
    }
}
