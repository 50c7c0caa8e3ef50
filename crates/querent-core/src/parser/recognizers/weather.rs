use std::sync::LazyLock;

use regex::Regex;

use crate::parser::patterns::{any_match, city, compile};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{Plan, Step};

static SUMMARIZE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"summarize\s+(?:today's\s+)?(?:weather|temperature)\s+in\s+([a-z\s]+?)\s+in\s+(\d+)\s+words?")
});
static GET: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?:get|show|check)\s+(?:the\s+)?(?:weather|temperature)\s+(?:in|for|of)\s+([a-z\s]+)")
});
static SIMPLE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?:weather|temperature)\s+(?:in|for|of)\s+([a-z\s]+)"));

/// Current reading for a single city
pub struct WeatherRecognizer;

impl Recognizer for WeatherRecognizer {
    fn name(&self) -> &str {
        "weather"
    }

    fn priority(&self) -> i32 {
        8
    }

    fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        any_match(&[&SUMMARIZE, &GET, &SIMPLE], &text)
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();
        let caps = SUMMARIZE
            .captures(&text)
            .or_else(|| GET.captures(&text))
            .or_else(|| SIMPLE.captures(&text))
            .ok_or(RecognizeError::NoRule)?;
        let city = city(&caps, 1)?;
        let description = format!("Get weather for {}", city);
        Ok(Plan::single_tool(
            Step::new(names::WEATHER, "get_weather")
                .with_param("city", city)
                .with_description(description.clone()),
            description,
        ))
    }
}
