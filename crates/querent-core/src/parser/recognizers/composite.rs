//! Highest-priority recognizer for questions spanning several tools:
//! percentages, who-is lookups, summaries, arithmetic over an averaged
//! temperature, and conversion of an averaged amount.

use std::sync::LazyLock;

use regex::Regex;

use super::currency::convert_step;
use crate::parser::patterns::{
    aggregate_step, any_match, calculator_step, capture, city, clean_city, compile, num, number,
    temperature_step,
};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{ParamValue, Plan, Step};

static PERCENTAGE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+(?:\.\d+)?)\s*%\s*of\s+(\d+(?:\.\d+)?)"));
static ADD_TO: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:add|plus)\s+(\d+(?:\.\d+)?)\s+to"));
static BASIC_MATH: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(\d+(?:\.\d+)?)\s*([+\-*/])\s*(\d+(?:\.\d+)?)"));
static WEATHER_IN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:weather|temperature)\s+in\s+([a-z\s]+)"));
static AVERAGE_TEMPERATURE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"average\s+(?:temperature|weather)"));
static WHO_IS: LazyLock<Regex> = LazyLock::new(|| compile(r"who\s+is\s+([a-z\s]+)"));
static CONVERT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:convert|change|exchange|transform)\s+(.+?)\s+([a-z]{3})\s+(?:to|into)\s+([a-z]{3})")
});
static SUMMARIZE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"summarize\s+(.+?)\s+in\s+(\d+)\s+words?"));

static CITY_IN: LazyLock<Regex> = LazyLock::new(|| compile(r"in\s+([a-z\s]+)"));
static ADD_VALUE: LazyLock<Regex> = LazyLock::new(|| compile(r"add\s+(\d+(?:\.\d+)?)"));
static AVERAGE_CITIES: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"average\s+temperature\s+in\s+([a-z\s]+?)\s+and\s+([a-z\s]+?)(?:\s+right\s+now)?[.?!]?$")
});
static CONVERT_AGGREGATE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"convert\s+(?:the\s+)?(average|sum)\s+of\s+(\d+(?:\.\d+)?)\s+and\s+(\d+(?:\.\d+)?)\s+([a-z]{3})\s+(?:to|into)\s+([a-z]{3})\b",
    )
});
static DIRECT_CONVERT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:convert|change|exchange|transform)\s+(\d+(?:\.\d+)?)\s+([a-z]{3})\s+(?:to|into)\s+([a-z]{3})\b",
    )
});

pub struct CompositeRecognizer;

impl CompositeRecognizer {
    fn summarize(&self, text: &str) -> Result<Option<Plan>, RecognizeError> {
        let Some(caps) = SUMMARIZE.captures(text) else {
            return Ok(None);
        };
        let content = capture(&caps, 1).ok_or(RecognizeError::Missing("content"))?;
        let words = &caps[2];

        let about_weather = content.contains("weather") || content.contains("temperature");
        if about_weather {
            if let Some(city_caps) = CITY_IN.captures(content) {
                let city = city(&city_caps, 1)?;
                return Ok(Some(Plan::multi_step(
                    vec![
                        Step::new(names::WEATHER, "get_weather")
                            .with_param("city", city.as_str())
                            .with_description(format!("Get weather data for {}", city))
                            .bind_as("weather_data"),
                        Step::new(names::LLM, "generate")
                            .with_param(
                                "prompt",
                                format!("Summarize ${{weather_data}} in exactly {} words", words),
                            )
                            .with_description(format!("Summarize weather in {} words", words)),
                    ],
                    format!("Summarize weather in {} in {} words", city, words),
                )));
            }
        }

        let prompt = format!("Summarize {} in exactly {} words", content, words);
        Ok(Some(Plan::generation_step(
            Step::new(names::LLM, "generate")
                .with_param("prompt", prompt.as_str())
                .with_description(format!("Summarize in {} words", words)),
            prompt,
        )))
    }

    fn add_to_average_temperature(&self, text: &str) -> Result<Option<Plan>, RecognizeError> {
        if !(text.contains("add") && text.contains("average temperature")) {
            return Ok(None);
        }
        let (Some(value_caps), Some(city_caps)) =
            (ADD_VALUE.captures(text), AVERAGE_CITIES.captures(text))
        else {
            return Ok(None);
        };
        let value = number(&value_caps, 1)?;
        let first = city(&city_caps, 1)?;
        let second = city(&city_caps, 2)?;

        Ok(Some(Plan::multi_step(
            vec![
                temperature_step(&first, "temp1"),
                temperature_step(&second, "temp2"),
                aggregate_step("average", &["temp1", "temp2"])
                    .with_description("Calculate average temperature")
                    .bind_as("avg_temp"),
                calculator_step(
                    "add",
                    ParamValue::reference("avg_temp"),
                    ParamValue::Number(value),
                )
                .with_description(format!("Add {} to average temperature", num(value))),
            ],
            format!(
                "Add {} to average temperature in {} and {}",
                num(value),
                first,
                second
            ),
        )))
    }

    fn convert_aggregate(&self, text: &str) -> Result<Option<Plan>, RecognizeError> {
        if !text.contains("convert") {
            return Ok(None);
        }
        let Some(caps) = CONVERT_AGGREGATE.captures(text) else {
            return Ok(None);
        };
        let aggregate = &caps[1];
        let (a, b) = (number(&caps, 2)?, number(&caps, 3)?);
        let (from, to) = (&caps[4], &caps[5]);
        let binding = format!("{}_amount", if aggregate == "average" { "avg" } else { "sum" });

        Ok(Some(Plan::multi_step(
            vec![
                Step::new(names::CALCULATOR, aggregate)
                    .with_param("numbers", vec![ParamValue::Number(a), ParamValue::Number(b)])
                    .with_description(format!("Calculate {} of {} and {}", aggregate, num(a), num(b)))
                    .bind_as(binding.as_str()),
                convert_step(ParamValue::reference(binding.as_str()), from, to).with_description(
                    format!("Convert to {}", to.to_uppercase()),
                ),
            ],
            format!(
                "Convert {} of {} and {} {} to {}",
                aggregate,
                num(a),
                num(b),
                from.to_uppercase(),
                to.to_uppercase()
            ),
        )))
    }
}

impl Recognizer for CompositeRecognizer {
    fn name(&self) -> &str {
        "composite"
    }

    fn priority(&self) -> i32 {
        60
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        any_match(
            &[
                &PERCENTAGE,
                &ADD_TO,
                &BASIC_MATH,
                &WEATHER_IN,
                &AVERAGE_TEMPERATURE,
                &WHO_IS,
                &CONVERT,
                &SUMMARIZE,
            ],
            &text,
        )
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();

        if let Some(caps) = PERCENTAGE.captures(&text) {
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

        if let Some(caps) = WHO_IS.captures(&text) {
            let subject = capture(&caps, 1)
                .map(clean_city)
                .ok_or(RecognizeError::Missing("subject"))?;
            let description = format!("Look up {}", subject);
            return Ok(Plan::single_tool(
                Step::new(names::KNOWLEDGE_BASE, "kb_lookup")
                    .with_param("query", subject)
                    .with_description(description.clone()),
                description,
            ));
        }

        if let Some(plan) = self.summarize(&text)? {
            return Ok(plan);
        }

        if let Some(plan) = self.add_to_average_temperature(&text)? {
            return Ok(plan);
        }

        if let Some(plan) = self.convert_aggregate(&text)? {
            return Ok(plan);
        }

        if let Some(caps) = DIRECT_CONVERT.captures(&text) {
            let amount = number(&caps, 1)?;
            let description = format!(
                "Convert {} {} to {}",
                num(amount),
                caps[2].to_uppercase(),
                caps[3].to_uppercase()
            );
            return Ok(Plan::single_tool(
                convert_step(amount, &caps[2], &caps[3]).with_description(description.clone()),
                description,
            ));
        }

        Err(RecognizeError::NoRule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntentKind;

    fn parse(text: &str) -> Plan {
        assert!(CompositeRecognizer.matches(text), "should match: {}", text);
        CompositeRecognizer.parse(text).expect("parse")
    }

    #[test]
    fn test_percentage_is_single_tool() {
        let plan = parse("What is 25% of 100?");
        assert_eq!(plan.kind, IntentKind::SingleTool);
        assert_eq!(plan.steps[0].qualified_name(), "calculator.percent_of");
    }

    #[test]
    fn test_add_to_average_temperature_builds_four_steps() {
        let plan = parse("Add 10 to the average temperature in Paris and London right now.");
        assert_eq!(plan.kind, IntentKind::MultiStep);
        assert_eq!(plan.steps.len(), 4);
        assert_eq!(
            plan.steps[0].parameters.get("city"),
            Some(&ParamValue::Text("paris".to_string()))
        );
        assert_eq!(
            plan.steps[1].parameters.get("city"),
            Some(&ParamValue::Text("london".to_string()))
        );
        assert_eq!(plan.steps[2].result_binding.as_deref(), Some("avg_temp"));
        assert_eq!(
            plan.steps[2].parameters.get("numbers"),
            Some(&ParamValue::List(vec![
                ParamValue::reference("temp1"),
                ParamValue::reference("temp2"),
            ]))
        );
        assert_eq!(
            plan.steps[3].parameters.get("first_number"),
            Some(&ParamValue::reference("avg_temp"))
        );
        assert_eq!(
            plan.steps[3].parameters.get("second_number"),
            Some(&ParamValue::Number(10.0))
        );
        assert!(plan.description.contains("temperature"));
    }

    #[test]
    fn test_convert_average_builds_two_steps() {
        let plan = parse("Convert the average of 10 and 20 USD into EUR");
        assert_eq!(plan.kind, IntentKind::MultiStep);
        assert_eq!(plan.steps[0].qualified_name(), "calculator.average");
        assert_eq!(plan.steps[0].result_binding.as_deref(), Some("avg_amount"));
        assert_eq!(plan.steps[1].qualified_name(), "currency.currency_convert");
        assert_eq!(
            plan.steps[1].parameters.get("amount"),
            Some(&ParamValue::reference("avg_amount"))
        );
        assert_eq!(
            plan.steps[1].parameters.get("to_currency"),
            Some(&ParamValue::Text("EUR".to_string()))
        );
    }

    #[test]
    fn test_summarize_weather_builds_lookup_then_generation() {
        let plan = parse("Summarize today's weather in Paris in 3 words.");
        assert_eq!(plan.kind, IntentKind::MultiStep);
        assert_eq!(plan.steps[0].result_binding.as_deref(), Some("weather_data"));
        assert_eq!(
            plan.steps[1].parameters.get("prompt"),
            Some(&ParamValue::Text(
                "Summarize ${weather_data} in exactly 3 words".to_string()
            ))
        );
    }

    #[test]
    fn test_summarize_other_content_is_generation_step() {
        let plan = parse("Summarize the history of rome in 10 words");
        assert_eq!(plan.kind, IntentKind::GenerationRequired);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].qualified_name(), "llm.generate");
    }

    #[test]
    fn test_weather_lookup_alone_is_left_to_other_recognizers() {
        assert!(CompositeRecognizer.matches("What is the weather in Paris?"));
        assert!(CompositeRecognizer.parse("What is the weather in Paris?").is_err());
    }
}
