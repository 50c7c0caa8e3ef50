//! Multi-tool recognizer for temperature arithmetic, city comparisons,
//! currency aggregates and weather summaries.
//!
//! City lists longer than two keep only the first and last city.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::currency::convert_step;
use crate::parser::patterns::{
    aggregate_step, any_match, calculator_step, capitalize, city, compile, num, number,
    operation_for, temperature_step,
};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{ParamValue, Plan, Step};

static MATH_AVG_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(add|subtract|plus|minus|multiply|divide|times)\s+(\d+(?:\.\d+)?)\s+(?:to|from|by|with)\s+(?:the\s+)?average\s+(?:temperature|weather)\s+(?:of\s+|in\s+)(\w+(?:\s+\w+)*?)\s+and\s+(\w+(?:\s+\w+)*?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static MATH_SPECIFIC_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(add|subtract|plus|minus|multiply|divide|times)\s+(\d+(?:\.\d+)?)\s+(?:to|from|by|with)\s+(?:the\s+)?(?:temperature|weather)\s+(?:of\s+|in\s+)(\w+(?:\s+\w+)*?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static VERB_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(increase|boost|raise|reduce|decrease|lower|multiply|divide|split|scale)\s+(?:the\s+)?(average\s+)?(?:temperature|weather)\s+(?:of\s+|in\s+)(\w+(?:\s+\w+)*?)(?:\s+and\s+(\w+(?:\s+\w+)*?))?\s+by\s+(\d+(?:\.\d+)?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static SCALE_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(double|triple|halve|quarter)\s+(?:the\s+)?(average\s+)?(?:temperature|weather)\s+(?:of\s+|in\s+)(\w+(?:\s+\w+)*?)(?:\s+and\s+(\w+(?:\s+\w+)*?))?(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static IF_TEMP_MATH: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"if\s+(?:the\s+)?(?:temperature|weather)\s+(?:in\s+)?(\w+(?:\s+\w+)*?)\s+is\s+(\d+(?:\.\d+)?)\s*(?:°\s*c|degrees)?\s*(?:,\s*|\s+)(?:and\s+|then\s+)?(?:i\s+)?(add|subtract|multiply|divide|plus|minus|times)\s+(\d+(?:\.\d+)?)",
    )
});
static MULTI_CITY_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(average|sum|total|combine)\s+(?:the\s+)?(?:temperatures?|weather)\s+(?:of\s+|in\s+|across\s+)(\w+(?:\s+\w+)*?)(?:\s*,\s*\w+(?:\s+\w+)*?)*,?\s+and\s+(\w+(?:\s+\w+)*?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static COMPARE_TEMPS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:compare|difference|diff)\s+(?:the\s+)?(?:temperatures?|weather)\s+(?:of\s+|in\s+|between\s+)(\w+(?:\s+\w+)*?)\s+and\s+(\w+(?:\s+\w+)*?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static EXTREME_TEMP: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(highest|lowest|maximum|minimum|max|min|warmest|coldest|hottest)\s+(?:the\s+)?(?:temperatures?|weather)\s+(?:of\s+|in\s+|among\s+|between\s+)(\w+(?:\s+\w+)*?)(?:\s*,\s*\w+(?:\s+\w+)*?)*,?\s+and\s+(\w+(?:\s+\w+)*?)(?:\s+(?:right\s+now|now|today|currently))?[.?!]?\s*$",
    )
});
static CONVERT_AVG_CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:convert|change|exchange|transform)\s+(?:the\s+)?(average|sum|total)\s+of\s+(\d+(?:\.\d+)?)\s+and\s+(\d+(?:\.\d+)?)\s+([a-z]{3})\s+(?:to|into)\s+([a-z]{3})\b",
    )
});
static MATH_AVG_CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(add|subtract|plus|minus|multiply|divide|times)\s+(\d+(?:\.\d+)?)\s+(?:to|from|by|with)\s+(?:the\s+)?average\s+of\s+(\d+(?:\.\d+)?)\s+and\s+(\d+(?:\.\d+)?)",
    )
});
static SUMMARIZE_WEATHER: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"summarize\s+(?:the\s+)?(?:today's\s+)?(?:weather|temperature)\s+(?:temperature\s+)?(?:in|of|for)\s+(\w+(?:\s+\w+)*?)\s+in\s+(\d+)\s+words?",
    )
});

pub struct MultiStepRecognizer;

/// Temperature lookups for one or two cities, combined by average when two
fn temperature_source(first: &str, second: Option<&str>, average: bool) -> (Vec<Step>, &'static str) {
    match second {
        Some(second) if average => (
            vec![
                temperature_step(first, "temp1"),
                temperature_step(second, "temp2"),
                aggregate_step("average", &["temp1", "temp2"])
                    .with_description("Calculate average temperature")
                    .bind_as("avg_temp"),
            ],
            "avg_temp",
        ),
        _ => (vec![temperature_step(first, "temp1")], "temp1"),
    }
}

fn optional_city(caps: &Captures<'_>, index: usize) -> Result<Option<String>, RecognizeError> {
    match caps.get(index) {
        Some(_) => city(caps, index).map(Some),
        None => Ok(None),
    }
}

impl MultiStepRecognizer {
    fn math_on_average_temperature(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let word = &caps[1];
        let operation = operation_for(word)?;
        let value = number(caps, 2)?;
        let first = city(caps, 3)?;
        let second = city(caps, 4)?;
        let (mut steps, source) = temperature_source(&first, Some(&second), true);
        steps.push(
            calculator_step(
                operation,
                ParamValue::reference(source),
                ParamValue::Number(value),
            )
            .with_description(format!("{} {} with average temperature", capitalize(word), num(value))),
        );
        Ok(Plan::multi_step(
            steps,
            format!(
                "{} {} with average temperature of {} and {}",
                capitalize(word),
                num(value),
                first,
                second
            ),
        ))
    }

    fn math_on_city_temperature(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let word = &caps[1];
        let operation = operation_for(word)?;
        let value = number(caps, 2)?;
        let city = city(caps, 3)?;
        let (mut steps, source) = temperature_source(&city, None, false);
        steps.push(
            calculator_step(
                operation,
                ParamValue::reference(source),
                ParamValue::Number(value),
            )
            .with_description(format!("{} {} with temperature", capitalize(word), num(value))),
        );
        Ok(Plan::multi_step(
            steps,
            format!("{} {} with temperature in {}", capitalize(word), num(value), city),
        ))
    }

    fn adjust_temperature(
        word: &str,
        operation: &str,
        value: f64,
        caps: &Captures<'_>,
    ) -> Result<Plan, RecognizeError> {
        let average = caps.get(2).is_some();
        let first = city(caps, 3)?;
        let second = optional_city(caps, 4)?;
        let (mut steps, source) = temperature_source(&first, second.as_deref(), average);
        steps.push(
            calculator_step(
                operation,
                ParamValue::reference(source),
                ParamValue::Number(value),
            )
            .with_description(format!("{} temperature by {}", capitalize(word), num(value))),
        );
        let cities = match &second {
            Some(second) if average => format!("average of {} and {}", first, second),
            _ => first.clone(),
        };
        Ok(Plan::multi_step(
            steps,
            format!("{} temperature in {} by {}", capitalize(word), cities, num(value)),
        ))
    }

    fn temperature_if(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let city = city(caps, 1)?;
        let temperature = number(caps, 2)?;
        let word = &caps[3];
        let operation = operation_for(word)?;
        let value = number(caps, 4)?;
        Ok(Plan::multi_step(
            vec![calculator_step(
                operation,
                ParamValue::Number(temperature),
                ParamValue::Number(value),
            )
            .with_description(format!("{} {} to given temperature", capitalize(word), num(value)))],
            format!(
                "{} {} to {}°C temperature in {}",
                capitalize(word),
                num(value),
                num(temperature),
                city
            ),
        ))
    }

    fn combine_cities(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let word = &caps[1];
        let first = city(caps, 2)?;
        let last = city(caps, 3)?;
        let (operation, label) = if word == "average" {
            ("average", "Average")
        } else {
            ("sum", "Sum")
        };
        Ok(Plan::multi_step(
            vec![
                temperature_step(&first, "temp1"),
                temperature_step(&last, "temp2"),
                aggregate_step(operation, &["temp1", "temp2"])
                    .with_description(format!("{} of temperatures", label)),
            ],
            format!("{} temperature of {} and {}", label, first, last),
        ))
    }

    fn compare_cities(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let first = city(caps, 1)?;
        let second = city(caps, 2)?;
        Ok(Plan::multi_step(
            vec![
                temperature_step(&first, "temp1"),
                temperature_step(&second, "temp2"),
                calculator_step(
                    "subtract",
                    ParamValue::reference("temp1"),
                    ParamValue::reference("temp2"),
                )
                .with_description("Calculate temperature difference"),
            ],
            format!("Compare temperatures between {} and {}", first, second),
        ))
    }

    fn extreme_of_cities(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let word = &caps[1];
        let first = city(caps, 2)?;
        let last = city(caps, 3)?;
        let (operation, label) = match word {
            "highest" | "maximum" | "max" | "warmest" | "hottest" => ("maximum", "Highest"),
            _ => ("minimum", "Lowest"),
        };
        Ok(Plan::multi_step(
            vec![
                temperature_step(&first, "temp1"),
                temperature_step(&last, "temp2"),
                aggregate_step(operation, &["temp1", "temp2"])
                    .with_description(format!("{} temperature", label)),
            ],
            format!("{} temperature of {} and {}", label, first, last),
        ))
    }

    fn convert_aggregate_amount(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let operation = if &caps[1] == "average" { "average" } else { "sum" };
        let (a, b) = (number(caps, 2)?, number(caps, 3)?);
        let (from, to) = (&caps[4], &caps[5]);
        Ok(Plan::multi_step(
            vec![
                Step::new(names::CALCULATOR, operation)
                    .with_param("numbers", vec![ParamValue::Number(a), ParamValue::Number(b)])
                    .with_description(format!("Calculate {} amount", operation))
                    .bind_as("aggregate_amount"),
                convert_step(ParamValue::reference("aggregate_amount"), from, to)
                    .with_description(format!("Convert to {}", to.to_uppercase())),
            ],
            format!(
                "Convert {} of {} and {} {} to {}",
                operation,
                num(a),
                num(b),
                from.to_uppercase(),
                to.to_uppercase()
            ),
        ))
    }

    fn math_on_average_amount(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let word = &caps[1];
        let operation = operation_for(word)?;
        let value = number(caps, 2)?;
        let (a, b) = (number(caps, 3)?, number(caps, 4)?);
        Ok(Plan::multi_step(
            vec![
                Step::new(names::CALCULATOR, "average")
                    .with_param("numbers", vec![ParamValue::Number(a), ParamValue::Number(b)])
                    .with_description("Calculate average amount")
                    .bind_as("avg_amount"),
                calculator_step(
                    operation,
                    ParamValue::reference("avg_amount"),
                    ParamValue::Number(value),
                )
                .with_description(format!("{} {} with average amount", capitalize(word), num(value))),
            ],
            format!(
                "{} {} with average of {} and {}",
                capitalize(word),
                num(value),
                num(a),
                num(b)
            ),
        ))
    }

    fn summarize_weather(caps: &Captures<'_>) -> Result<Plan, RecognizeError> {
        let city = city(caps, 1)?;
        let words = &caps[2];
        Ok(Plan::multi_step(
            vec![
                Step::new(names::WEATHER, "get_weather")
                    .with_param("city", city.as_str())
                    .with_description(format!("Get weather data for {}", city))
                    .bind_as("weather_data"),
                Step::new(names::LLM, "generate")
                    .with_param(
                        "prompt",
                        format!(
                            "Summarize the weather ${{weather_data}} in {} in exactly {} words",
                            city, words
                        ),
                    )
                    .with_description(format!("Summarize weather in {} words", words)),
            ],
            format!("Summarize weather in {} in {} words", city, words),
        ))
    }
}

impl Recognizer for MultiStepRecognizer {
    fn name(&self) -> &str {
        "multi_step"
    }

    fn priority(&self) -> i32 {
        50
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        any_match(
            &[
                &MATH_AVG_TEMP,
                &MATH_SPECIFIC_TEMP,
                &VERB_TEMP,
                &SCALE_TEMP,
                &IF_TEMP_MATH,
                &MULTI_CITY_TEMP,
                &COMPARE_TEMPS,
                &EXTREME_TEMP,
                &CONVERT_AVG_CURRENCY,
                &MATH_AVG_CURRENCY,
                &SUMMARIZE_WEATHER,
            ],
            &text,
        )
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();

        if let Some(caps) = MATH_AVG_TEMP.captures(&text) {
            return Self::math_on_average_temperature(&caps);
        }
        if let Some(caps) = MATH_SPECIFIC_TEMP.captures(&text) {
            return Self::math_on_city_temperature(&caps);
        }
        if let Some(caps) = VERB_TEMP.captures(&text) {
            let word = &caps[1];
            return Self::adjust_temperature(word, operation_for(word)?, number(&caps, 5)?, &caps);
        }
        if let Some(caps) = SCALE_TEMP.captures(&text) {
            let word = &caps[1];
            let (operation, factor) = match word {
                "double" => ("multiply", 2.0),
                "triple" => ("multiply", 3.0),
                "halve" => ("divide", 2.0),
                _ => ("divide", 4.0),
            };
            return Self::adjust_temperature(word, operation, factor, &caps);
        }
        if let Some(caps) = IF_TEMP_MATH.captures(&text) {
            return Self::temperature_if(&caps);
        }
        if let Some(caps) = MULTI_CITY_TEMP.captures(&text) {
            return Self::combine_cities(&caps);
        }
        if let Some(caps) = COMPARE_TEMPS.captures(&text) {
            return Self::compare_cities(&caps);
        }
        if let Some(caps) = EXTREME_TEMP.captures(&text) {
            return Self::extreme_of_cities(&caps);
        }
        if let Some(caps) = CONVERT_AVG_CURRENCY.captures(&text) {
            return Self::convert_aggregate_amount(&caps);
        }
        if let Some(caps) = MATH_AVG_CURRENCY.captures(&text) {
            return Self::math_on_average_amount(&caps);
        }
        if let Some(caps) = SUMMARIZE_WEATHER.captures(&text) {
            return Self::summarize_weather(&caps);
        }

        Err(RecognizeError::NoRule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntentKind;

    fn parse(text: &str) -> Plan {
        assert!(MultiStepRecognizer.matches(text), "should match: {}", text);
        MultiStepRecognizer.parse(text).expect("parse")
    }

    fn cities(plan: &Plan) -> Vec<String> {
        plan.steps
            .iter()
            .filter(|step| step.tool == names::WEATHER)
            .filter_map(|step| step.parameters.get("city").and_then(ParamValue::as_text))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_subtract_from_average_temperature() {
        let plan = parse("Subtract 5 from the average temperature in Paris and London right now.");
        assert_eq!(plan.kind, IntentKind::MultiStep);
        assert_eq!(plan.steps.len(), 4);
        assert_eq!(cities(&plan), vec!["paris", "london"]);
        let last = &plan.steps[3];
        assert_eq!(last.operation, "subtract");
        assert_eq!(
            last.parameters.get("first_number"),
            Some(&ParamValue::reference("avg_temp"))
        );
        assert_eq!(last.parameters.get("second_number"), Some(&ParamValue::Number(5.0)));
    }

    #[test]
    fn test_weather_word_routes_like_temperature() {
        let by_weather = parse("Multiply 2 with the average weather in Paris and London");
        let by_temperature = parse("Multiply 2 with the average temperature in Paris and London");
        assert_eq!(by_weather.steps, by_temperature.steps);
    }

    #[test]
    fn test_multi_word_city_names() {
        let plan = parse("Add 3 to the average temperature of New York and San Francisco");
        assert_eq!(cities(&plan), vec!["new york", "san francisco"]);
    }

    #[test]
    fn test_single_city_arithmetic() {
        let plan = parse("Add 5 to the temperature in Dhaka");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(cities(&plan), vec!["dhaka"]);
        assert_eq!(
            plan.steps[1].parameters.get("first_number"),
            Some(&ParamValue::reference("temp1"))
        );
    }

    #[test]
    fn test_interior_cities_are_ignored() {
        let plan = parse("Average the temperatures of Paris, London and Berlin");
        assert_eq!(cities(&plan), vec!["paris", "berlin"]);
        assert_eq!(plan.steps[2].operation, "average");
    }

    #[test]
    fn test_sum_of_temperatures_uses_sum() {
        let plan = parse("Sum the temperatures of Paris and London");
        assert_eq!(plan.steps[2].operation, "sum");
    }

    #[test]
    fn test_compare_temperatures() {
        let plan = parse("Compare the temperatures between Paris and London");
        assert_eq!(plan.steps[2].operation, "subtract");
        assert_eq!(cities(&plan), vec!["paris", "london"]);
    }

    #[test]
    fn test_highest_temperature() {
        let plan = parse("What is the highest temperature in Paris, Dhaka and London?");
        assert_eq!(plan.steps[2].operation, "maximum");
        assert_eq!(cities(&plan), vec!["paris", "london"]);
    }

    #[test]
    fn test_verb_forms() {
        let plan = parse("Increase the temperature in Berlin by 7");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].operation, "add");
        assert_eq!(
            plan.steps[1].parameters.get("second_number"),
            Some(&ParamValue::Number(7.0))
        );

        let plan = parse("Double the average temperature of Paris and London");
        assert_eq!(plan.steps.len(), 4);
        assert_eq!(plan.steps[3].operation, "multiply");
        assert_eq!(
            plan.steps[3].parameters.get("second_number"),
            Some(&ParamValue::Number(2.0))
        );

        let plan = parse("Halve the temperature in Dhaka");
        assert_eq!(plan.steps[1].operation, "divide");
    }

    #[test]
    fn test_if_temperature_is_literal() {
        let plan = parse("If the temperature in Paris is 18°C, add 5");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(
            plan.steps[0].parameters.get("first_number"),
            Some(&ParamValue::Number(18.0))
        );
        assert!(plan.description.contains("temperature"));
    }

    #[test]
    fn test_if_temperature_with_first_person_operator() {
        let plan = parse("If the temperature in Paris is 18 and I add 5");
        assert_eq!(plan.kind, IntentKind::MultiStep);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].tool, names::CALCULATOR);
        assert_eq!(plan.steps[0].operation, "add");
        assert_eq!(
            plan.steps[0].parameters.get("second_number"),
            Some(&ParamValue::Number(5.0))
        );
        assert!(cities(&plan).is_empty());
        assert!(plan.description.ends_with("in paris"), "{}", plan.description);

        let plan = parse("If the weather in London is 17 and I subtract 3");
        assert_eq!(plan.steps[0].operation, "subtract");
        assert_eq!(
            plan.steps[0].parameters.get("first_number"),
            Some(&ParamValue::Number(17.0))
        );
    }

    #[test]
    fn test_math_on_average_amount() {
        let plan = parse("Add 20 to the average of 30 and 40 USD");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].operation, "add");
        assert!(!plan.description.contains("temperature"));
    }

    #[test]
    fn test_convert_sum_of_amounts() {
        let plan = parse("Convert the sum of 25 and 75 USD into GBP");
        assert_eq!(plan.steps[0].operation, "sum");
        assert_eq!(plan.steps[1].qualified_name(), "currency.currency_convert");
    }

    #[test]
    fn test_summarize_weather_prompt() {
        let plan = parse("Summarize the weather in Dhaka in 5 words");
        assert_eq!(
            plan.steps[1].parameters.get("prompt"),
            Some(&ParamValue::Text(
                "Summarize the weather ${weather_data} in dhaka in exactly 5 words"
                    .to_string()
            ))
        );
    }
}
