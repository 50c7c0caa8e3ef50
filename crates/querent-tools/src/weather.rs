//! Weather tool backed by a static temperature table

use std::collections::BTreeMap;

use async_trait::async_trait;

use querent_config::WeatherConfig;
use querent_core::tool::{names, Tool, ToolError, ToolInput};
use querent_core::ToolValue;

pub struct WeatherTool {
    temperatures: BTreeMap<String, f64>,
    default_temperature: f64,
    unit: String,
}

impl WeatherTool {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            temperatures: config
                .temperatures
                .iter()
                .map(|(city, temp)| (city.trim().to_lowercase(), *temp))
                .collect(),
            default_temperature: config.default_temperature,
            unit: config.unit.clone(),
        }
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Temperature for `city`; unknown cities get the default.
    pub fn temperature(&self, city: &str) -> f64 {
        self.temperatures
            .get(&city.trim().to_lowercase())
            .copied()
            .unwrap_or(self.default_temperature)
    }

    /// `18°C`, `19.5°C`
    pub fn reading(&self, city: &str) -> String {
        let temp = self.temperature(city);
        if temp.fract() == 0.0 {
            format!("{:.0}{}", temp, self.unit)
        } else {
            format!("{}{}", temp, self.unit)
        }
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new(&WeatherConfig::default())
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        names::WEATHER
    }

    fn description(&self) -> &str {
        "Current temperature for a city"
    }

    fn operations(&self) -> &[&'static str] {
        &["get_weather"]
    }

    async fn call(&self, _operation: &str, input: ToolInput) -> Result<ToolValue, ToolError> {
        let city = input.text("city")?;
        if city.trim().is_empty() {
            return Err(ToolError::invalid("city", "must not be empty"));
        }
        let reading = self.reading(&city);
        tracing::debug!(city = %city.trim(), reading = %reading, "weather lookup");
        Ok(ToolValue::Text(reading))
    }
}
