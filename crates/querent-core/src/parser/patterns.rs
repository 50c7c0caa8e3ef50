//! Helpers shared by the built-in recognizers

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::RecognizeError;
use crate::tool::names;
use crate::types::{format_number, ParamValue, Step};

const TRAILING_QUALIFIERS: [&str; 5] = [" right now", " currently", " tonight", " today", " now"];

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid recognizer pattern")
}

pub(crate) fn any_match(patterns: &[&LazyLock<Regex>], text: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(text))
}

/// Numeric capture group `index`
pub(crate) fn number(caps: &Captures<'_>, index: usize) -> Result<f64, RecognizeError> {
    let raw = caps
        .get(index)
        .map(|m| m.as_str())
        .ok_or(RecognizeError::Missing("number"))?;
    raw.parse()
        .map_err(|_| RecognizeError::InvalidNumber(raw.to_string()))
}

/// Trimmed text capture group `index`
pub(crate) fn capture<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// City name without punctuation or trailing time qualifiers
pub(crate) fn clean_city(raw: &str) -> String {
    let mut city = raw
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '?' | '!' | ','))
        .trim()
        .to_string();
    loop {
        let before = city.len();
        for qualifier in TRAILING_QUALIFIERS {
            if let Some(stripped) = city.strip_suffix(qualifier) {
                city = stripped.trim_end().to_string();
            }
        }
        if city.len() == before {
            break;
        }
    }
    city
}

pub(crate) fn city(caps: &Captures<'_>, index: usize) -> Result<String, RecognizeError> {
    capture(caps, index)
        .map(clean_city)
        .filter(|c| !c.is_empty())
        .ok_or(RecognizeError::Missing("city"))
}

/// Calculator operation for an arithmetic word
pub(crate) fn operation_for(word: &str) -> Result<&'static str, RecognizeError> {
    match word {
        "add" | "plus" | "increase" | "boost" | "raise" => Ok("add"),
        "subtract" | "minus" | "reduce" | "decrease" | "lower" => Ok("subtract"),
        "multiply" | "times" | "scale" => Ok("multiply"),
        "divide" | "split" => Ok("divide"),
        other => Err(RecognizeError::UnsupportedOperator(other.to_string())),
    }
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn temperature_step(city: &str, binding: &str) -> Step {
    Step::new(names::WEATHER, "get_weather")
        .with_param("city", city)
        .with_description(format!("Get temperature in {}", city))
        .bind_as(binding)
}

pub(crate) fn calculator_step(operation: &str, first: ParamValue, second: ParamValue) -> Step {
    Step::new(names::CALCULATOR, operation)
        .with_param("first_number", first)
        .with_param("second_number", second)
}

pub(crate) fn aggregate_step(operation: &str, bindings: &[&str]) -> Step {
    Step::new(names::CALCULATOR, operation).with_param(
        "numbers",
        bindings
            .iter()
            .map(|b| ParamValue::reference(*b))
            .collect::<Vec<_>>(),
    )
}

/// `format_number` for use in descriptions
pub(crate) fn num(value: f64) -> String {
    format_number(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_city_strips_qualifiers_and_punctuation() {
        assert_eq!(clean_city(" london right now."), "london");
        assert_eq!(clean_city("paris today"), "paris");
        assert_eq!(clean_city("new york"), "new york");
        assert_eq!(clean_city("dhaka currently?"), "dhaka");
    }

    #[test]
    fn test_operation_words() {
        assert_eq!(operation_for("plus").expect("plus"), "add");
        assert_eq!(operation_for("times").expect("times"), "multiply");
        assert!(operation_for("modulo").is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("subtract"), "Subtract");
        assert_eq!(capitalize(""), "");
    }
}
