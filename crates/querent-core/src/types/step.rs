//! Step type definitions
//!
//! Step represents one tool invocation in a Plan.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::ParamValue;

/// Ordered parameter map (insertion order is preserved).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a parameter, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One tool invocation inside a plan
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Step {
    /// Tool name as registered in the tool registry
    pub tool: String,
    /// Operation on that tool
    pub operation: String,
    /// Parameters, possibly holding `${name}` references
    pub parameters: Parameters,
    /// Human-readable description
    pub description: String,
    /// When set, the step result is stored in the run scope under this name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_binding: Option<String>,
}

impl Step {
    pub fn new(tool: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            operation: operation.into(),
            parameters: Parameters::new(),
            description: String::new(),
            result_binding: None,
        }
    }

    /// Add a parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name, value);
        self
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Bind the result of this step to a scope variable
    pub fn bind_as(mut self, name: impl Into<String>) -> Self {
        self.result_binding = Some(name.into());
        self
    }

    /// `tool.operation`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.tool, self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_preserve_insertion_order_and_replace_in_place() {
        let mut params = Parameters::new();
        params.insert("second_number", 2.0);
        params.insert("first_number", 1.0);
        let previous = params.insert("second_number", 3.0);

        assert_eq!(previous, Some(ParamValue::Number(2.0)));
        assert_eq!(params.names(), vec!["second_number", "first_number"]);
        assert_eq!(params.get("second_number"), Some(&ParamValue::Number(3.0)));
    }

    #[test]
    fn test_step_builder() {
        let step = Step::new("calculator", "add")
            .with_param("first_number", "${avg_temp}")
            .with_param("second_number", 10.0)
            .with_description("Add 10.0 to average temperature")
            .bind_as("result");

        assert_eq!(step.qualified_name(), "calculator.add");
        assert_eq!(
            step.parameters.get("first_number"),
            Some(&ParamValue::reference("avg_temp"))
        );
        assert_eq!(step.result_binding.as_deref(), Some("result"));
    }

    #[test]
    fn test_step_serializes_parameters_as_map() {
        let step = Step::new("weather", "get_weather").with_param("city", "paris");
        let json = serde_json::to_value(&step).expect("serialize");
        assert_eq!(json["parameters"]["city"], "paris");
        assert!(json.get("result_binding").is_none());
    }
}
