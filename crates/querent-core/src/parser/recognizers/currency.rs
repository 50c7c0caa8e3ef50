use std::sync::LazyLock;

use regex::Regex;

use crate::parser::patterns::{compile, num, number};
use crate::parser::{RecognizeError, Recognizer};
use crate::tool::names;
use crate::types::{Plan, Step};

static CONVERT_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?:convert|change|exchange|transform)\s+(\d+(?:\.\d+)?)\s+([a-z]{3})\s+(?:to|into|in)\s+([a-z]{3})\b",
    )
});

/// Direct conversion of a literal amount
pub struct CurrencyRecognizer;

/// Conversion step shared with the multi-tool recognizers
pub(crate) fn convert_step(amount: impl Into<crate::types::ParamValue>, from: &str, to: &str) -> Step {
    Step::new(names::CURRENCY, "currency_convert")
        .with_param("amount", amount)
        .with_param("from_currency", from.to_uppercase())
        .with_param("to_currency", to.to_uppercase())
}

impl Recognizer for CurrencyRecognizer {
    fn name(&self) -> &str {
        "currency"
    }

    fn priority(&self) -> i32 {
        40
    }

    fn matches(&self, text: &str) -> bool {
        CONVERT_AMOUNT.is_match(&text.to_lowercase())
    }

    fn parse(&self, text: &str) -> Result<Plan, RecognizeError> {
        let text = text.to_lowercase();
        let caps = CONVERT_AMOUNT
            .captures(&text)
            .ok_or(RecognizeError::NoRule)?;
        let amount = number(&caps, 1)?;
        let description = format!(
            "Convert {} {} to {}",
            num(amount),
            caps[2].to_uppercase(),
            caps[3].to_uppercase()
        );
        Ok(Plan::single_tool(
            convert_step(amount, &caps[2], &caps[3]).with_description(description.clone()),
            description,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamValue;

    #[test]
    fn test_convert_with_verb_variants() {
        for text in [
            "Convert 100 USD to EUR",
            "Change 100 usd into eur",
            "exchange 100 USD to EUR",
        ] {
            let plan = CurrencyRecognizer.parse(text).expect("parse");
            let params = &plan.steps[0].parameters;
            assert_eq!(params.get("amount"), Some(&ParamValue::Number(100.0)));
            assert_eq!(
                params.get("from_currency"),
                Some(&ParamValue::Text("USD".to_string()))
            );
            assert_eq!(
                params.get("to_currency"),
                Some(&ParamValue::Text("EUR".to_string()))
            );
        }
    }

    #[test]
    fn test_currency_words_longer_than_codes_do_not_match() {
        assert!(!CurrencyRecognizer.matches("convert 100 usd to dollars"));
    }
}
