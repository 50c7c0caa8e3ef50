//! ToolInput type definition

use super::ToolError;
use crate::types::{ParamValue, Parameters};

/// Resolved parameters for one tool call
#[derive(Debug, Clone, Default)]
pub struct ToolInput {
    pub params: Parameters,
}

impl ToolInput {
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        let value = self
            .get(name)
            .ok_or_else(|| ToolError::MissingParameter(name.to_string()))?;
        value
            .as_number()
            .ok_or_else(|| ToolError::invalid(name, format!("expected a number, got '{}'", value.render())))
    }

    pub fn optional_number(&self, name: &str) -> Result<Option<f64>, ToolError> {
        match self.get(name) {
            None => Ok(None),
            Some(_) => self.number(name).map(Some),
        }
    }

    /// Text view of a parameter; numbers are rendered.
    pub fn text(&self, name: &str) -> Result<String, ToolError> {
        match self.get(name) {
            Some(ParamValue::Text(text)) => Ok(text.clone()),
            Some(ParamValue::Number(n)) => Ok(crate::types::format_number(*n)),
            Some(other) => Err(ToolError::invalid(
                name,
                format!("expected text, got '{}'", other.render()),
            )),
            None => Err(ToolError::MissingParameter(name.to_string())),
        }
    }

    pub fn numbers(&self, name: &str) -> Result<Vec<f64>, ToolError> {
        match self.get(name) {
            Some(ParamValue::List(items)) => items
                .iter()
                .map(|item| {
                    item.as_number().ok_or_else(|| {
                        ToolError::invalid(name, format!("'{}' is not a number", item.render()))
                    })
                })
                .collect(),
            Some(other) => Err(ToolError::invalid(
                name,
                format!("expected a list of numbers, got '{}'", other.render()),
            )),
            None => Err(ToolError::MissingParameter(name.to_string())),
        }
    }

    pub fn optional_numbers(&self, name: &str) -> Result<Option<Vec<f64>>, ToolError> {
        match self.get(name) {
            None => Ok(None),
            Some(_) => self.numbers(name).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: Vec<(&str, ParamValue)>) -> ToolInput {
        ToolInput::new(pairs.into_iter().collect())
    }

    #[test]
    fn test_number_accepts_numeric_text() {
        let input = input(vec![
            ("a", ParamValue::Number(2.5)),
            ("b", ParamValue::Text(" 4 ".to_string())),
            ("c", ParamValue::Text("18°C".to_string())),
        ]);
        assert_eq!(input.number("a").expect("a"), 2.5);
        assert_eq!(input.number("b").expect("b"), 4.0);
        assert!(matches!(
            input.number("c"),
            Err(ToolError::InvalidParameter { .. })
        ));
        assert!(matches!(
            input.number("missing"),
            Err(ToolError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_numbers_requires_a_list() {
        let input = input(vec![
            (
                "numbers",
                ParamValue::List(vec![ParamValue::Number(1.0), ParamValue::Number(2.0)]),
            ),
            ("single", ParamValue::Number(1.0)),
        ]);
        assert_eq!(input.numbers("numbers").expect("numbers"), vec![1.0, 2.0]);
        assert!(input.numbers("single").is_err());
        assert_eq!(input.optional_numbers("absent").expect("absent"), None);
    }

    #[test]
    fn test_text_renders_numbers() {
        let input = input(vec![("prompt", ParamValue::Number(3.0))]);
        assert_eq!(input.text("prompt").expect("prompt"), "3.0");
    }
}
