//! # Querent Config
//!
//! Single-file configuration for Querent.
//! One `querent.yaml` configures the normalizer, the built-in tools,
//! the generation backend and observability settings.

mod loader;
mod presets;

pub use loader::{load_config, load_config_or_default, validate_config, ConfigError};
pub use presets::PRESET_NAMES;

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration schema for Querent.
#[derive(Debug, Clone, Deserialize)]
pub struct QuerentConfig {
    /// Config schema version.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for QuerentConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            observability: ObservabilityConfig::default(),
            normalizer: NormalizerConfig::default(),
            tools: ToolsConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "querent".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_true")]
    pub traces_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            traces_enabled: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Prompt normalizer passes and extra correction tables.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_true")]
    pub spelling: bool,
    #[serde(default = "default_true")]
    pub abbreviations: bool,
    #[serde(default = "default_true")]
    pub math_symbols: bool,
    #[serde(default = "default_true")]
    pub sentence_case: bool,
    #[serde(default)]
    pub extra_spelling: BTreeMap<String, String>,
    #[serde(default)]
    pub extra_abbreviations: BTreeMap<String, String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            spelling: true,
            abbreviations: true,
            math_symbols: true,
            sentence_case: true,
            extra_spelling: BTreeMap::new(),
            extra_abbreviations: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
}

/// Static temperature table served by the weather tool.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Temperature for cities missing from the table.
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    #[serde(default = "default_temperatures")]
    pub temperatures: BTreeMap<String, f64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            unit: default_unit(),
            default_temperature: default_temperature(),
            temperatures: default_temperatures(),
        }
    }
}

fn default_unit() -> String {
    "°C".to_string()
}

fn default_temperature() -> f64 {
    20.0
}

fn default_temperatures() -> BTreeMap<String, f64> {
    [
        ("paris", 18.0),
        ("london", 17.0),
        ("dhaka", 31.0),
        ("amsterdam", 19.5),
    ]
    .into_iter()
    .map(|(city, temp)| (city.to_string(), temp))
    .collect()
}

/// Exchange rates relative to USD, plus an optional live rate source.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_rates")]
    pub rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub live: LiveRatesConfig,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rates: default_rates(),
            live: LiveRatesConfig::default(),
        }
    }
}

/// Pair-rate API queried before the static table.
///
/// Only used when an API key is found, either inline or in `api_key_env`.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveRatesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_rates_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_rates_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_rates_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LiveRatesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_rates_endpoint(),
            api_key: None,
            api_key_env: default_rates_api_key_env(),
            timeout_secs: default_rates_timeout_secs(),
        }
    }
}

impl LiveRatesConfig {
    /// Inline key first, then the environment; blank keys count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_rates_endpoint() -> String {
    "https://v6.exchangerate-api.com/v6".to_string()
}

fn default_rates_api_key_env() -> String {
    "EXCHANGE_RATE_API_KEY".to_string()
}

fn default_rates_timeout_secs() -> u64 {
    5
}

fn default_rates() -> BTreeMap<String, f64> {
    [
        ("USD", 1.0),
        ("EUR", 0.85),
        ("GBP", 0.73),
        ("JPY", 110.0),
        ("CAD", 1.25),
        ("AUD", 1.35),
        ("CHF", 0.92),
        ("CNY", 6.45),
    ]
    .into_iter()
    .map(|(code, rate)| (code.to_string(), rate))
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeBaseConfig {
    #[serde(default = "default_kb_path")]
    pub path: String,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            path: default_kb_path(),
        }
    }
}

fn default_kb_path() -> String {
    "data/kb.json".to_string()
}

/// Generation backend used for unmatched questions and `llm` steps.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// `offline` or `openai`.
    #[serde(default = "default_generation_mode")]
    pub mode: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_generation_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: default_generation_mode(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_generation_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            system_prompt: None,
        }
    }
}

pub const GENERATION_MODES: [&str; 2] = ["offline", "openai"];

fn default_generation_mode() -> String {
    "offline".to_string()
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_generation_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    150
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: QuerentConfig = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(config.version, 1);
        assert_eq!(config.app.name, "querent");
        assert_eq!(config.tools.weather.temperatures.get("paris"), Some(&18.0));
        assert_eq!(config.tools.currency.rates.get("GBP"), Some(&0.73));
        assert_eq!(config.generation.mode, "offline");
        assert!(config.normalizer.spelling);
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let yaml = r#"
tools:
  weather:
    default_temperature: 15
generation:
  model: local-model
"#;
        let config: QuerentConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.tools.weather.default_temperature, 15.0);
        assert_eq!(config.tools.weather.unit, "°C");
        assert_eq!(config.generation.model, "local-model");
        assert_eq!(config.generation.max_tokens, 150);
    }

    #[test]
    fn test_live_rates_key_resolution() {
        let yaml = r#"
tools:
  currency:
    live:
      api_key_env: QUERENT_TEST_RATES_KEY_NEVER_SET
"#;
        let config: QuerentConfig = serde_yaml::from_str(yaml).expect("parse");
        let live = &config.tools.currency.live;
        assert!(live.enabled);
        assert_eq!(live.timeout_secs, 5);
        assert_eq!(live.resolve_api_key(), None);
        assert_eq!(config.tools.currency.rates.get("EUR"), Some(&0.85));

        let mut live = live.clone();
        live.api_key = Some("  ".to_string());
        assert_eq!(live.resolve_api_key(), None);
        live.api_key = Some("abc123".to_string());
        assert_eq!(live.resolve_api_key().as_deref(), Some("abc123"));
    }
}
