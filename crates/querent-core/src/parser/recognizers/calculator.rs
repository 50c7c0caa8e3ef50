use std::sync::LazyLock;

use regex::Regex;

use crate::parser::patterns::{any_match, compile, num, number};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{ParamValue, Plan, Step};

static PERCENTAGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:what\s+is\s+|calculate\s+)?(\d+(?:\.\d+)?)\s*%\s+of\s+(\d+(?:\.\d+)?)")
});
static PERCENT_OF: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+(?:\.\d+)?)\s+percent\s+of\s+(\d+(?:\.\d+)?)"));
static ADDITION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:add|plus|sum)\s+(\d+(?:\.\d+)?)\s+(?:and|to|\+|with)\s+(\d+(?:\.\d+)?)")
});
static SUBTRACTION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:subtract|minus)\s+(\d+(?:\.\d+)?)\s+(?:from|-)\s+(\d+(?:\.\d+)?)")
});
static MULTIPLICATION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:multiply|times)\s+(\d+(?:\.\d+)?)\s+(?:by|\*|times)\s+(\d+(?:\.\d+)?)")
});
static DIVISION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"divide\s+(\d+(?:\.\d+)?)\s+(?:by|/)\s+(\d+(?:\.\d+)?)"));
static AVERAGE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:average|avg)\s+(?:of\s+)?\d+(?:\.\d+)?(?:(?:\s*,\s*(?:and\s+)?|\s+and\s+)\d+(?:\.\d+)?)+",
    )
});
static POWER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(\d+(?:\.\d+)?)\s*(?:\^|\*\*|to\s+the\s+power\s+of)\s*(\d+(?:\.\d+)?)")
});
static SIMPLE_MATH: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+(?:\.\d+)?)\s*([+\-*/])\s*(\d+(?:\.\d+)?)"));
static NUMBER: LazyLock<Regex> = LazyLock::new(|| compile(r"\d+(?:\.\d+)?"));

/// Single-operation arithmetic on literal numbers
pub struct CalculatorRecognizer;

fn binary(operation: &str, first: f64, second: f64, description: String) -> Plan {
    Plan::single_tool(
        Step::new(names::CALCULATOR, operation)
            .with_param("first_number", first)
            .with_param("second_number", second)
            .with_description(description.clone()),
        description,
    )
}

impl Recognizer for CalculatorRecognizer {
    fn name(&self) -> &str {
        "calculator"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        any_match(
            &[
                &PERCENTAGE,
                &PERCENT_OF,
                &ADDITION,
                &SUBTRACTION,
                &MULTIPLICATION,
                &DIVISION,
                &AVERAGE,
                &POWER,
                &SIMPLE_MATH,
            ],
            &text,
        )
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();

        if let Some(caps) = PERCENTAGE
            .captures(&text)
            .or_else(|| PERCENT_OF.captures(&text))
        {
            let percentage = number(&caps, 1)?;
            let base = number(&caps, 2)?;
            let description = format!("Calculate {}% of {}", num(percentage), num(base));
            return Ok(Plan::single_tool(
                Step::new(names::CALCULATOR, "percent_of")
                    .with_param("percentage", percentage)
                    .with_param("number", base)
                    .with_description(description.clone()),
                description,
            ));
        }

        if let Some(caps) = ADDITION.captures(&text) {
            let (a, b) = (number(&caps, 1)?, number(&caps, 2)?);
            return Ok(binary("add", a, b, format!("Add {} and {}", num(a), num(b))));
        }

        if let Some(caps) = SUBTRACTION.captures(&text) {
            // "subtract A from B" computes B - A
            let (a, b) = (number(&caps, 1)?, number(&caps, 2)?);
            return Ok(binary(
                "subtract",
                b,
                a,
                format!("Subtract {} from {}", num(a), num(b)),
            ));
        }

        if let Some(caps) = MULTIPLICATION.captures(&text) {
            let (a, b) = (number(&caps, 1)?, number(&caps, 2)?);
            return Ok(binary(
                "multiply",
                a,
                b,
                format!("Multiply {} by {}", num(a), num(b)),
            ));
        }

        if let Some(caps) = DIVISION.captures(&text) {
            let (a, b) = (number(&caps, 1)?, number(&caps, 2)?);
            return Ok(binary("divide", a, b, format!("Divide {} by {}", num(a), num(b))));
        }

        if let Some(found) = AVERAGE.find(&text) {
            let numbers = NUMBER
                .find_iter(found.as_str())
                .map(|m| {
                    m.as_str()
                        .parse::<f64>()
                        .map(ParamValue::Number)
                        .map_err(|_| RecognizeError::InvalidNumber(m.as_str().to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let description = format!("Average of {} numbers", numbers.len());
            return Ok(Plan::single_tool(
                Step::new(names::CALCULATOR, "average")
                    .with_param("numbers", numbers)
                    .with_description(description.clone()),
                description,
            ));
        }

        if let Some(caps) = POWER.captures(&text) {
            let (base, exponent) = (number(&caps, 1)?, number(&caps, 2)?);
            let description = format!("Raise {} to the power of {}", num(base), num(exponent));
            return Ok(Plan::single_tool(
                Step::new(names::CALCULATOR, "power")
                    .with_param("base", base)
                    .with_param("exponent", exponent)
                    .with_description(description.clone()),
                description,
            ));
        }

        if let Some(caps) = SIMPLE_MATH.captures(&text) {
            let (a, b) = (number(&caps, 1)?, number(&caps, 3)?);
            let operation = match &caps[2] {
                "+" => "add",
                "-" => "subtract",
                "*" => "multiply",
                "/" => "divide",
                other => return Err(RecognizeError::UnsupportedOperator(other.to_string())),
            };
            return Ok(binary(
                operation,
                a,
                b,
                format!("{} {} {}", num(a), &caps[2], num(b)),
            ));
        }

        Err(RecognizeError::NoRule)
    }
}
