//! # Querent Tools
//!
//! Built-in tools for Querent and their registration.
//!
//! - `calculator`: arithmetic, percentages, aggregates
//! - `weather`: static temperature table, exposed through a unit adapter
//! - `currency`: live pair rates when configured, USD-relative table otherwise
//! - `knowledge_base`: JSON entry lookup

mod calculator;
mod currency;
mod knowledge;
mod live_rates;
mod weather;

use std::sync::Arc;

use querent_config::ToolsConfig;
use querent_core::tool::{StandardAdapter, ToolRegistry, UnitValueAdapter};

pub use calculator::{calculate, CalculatorError, CalculatorTool};
pub use currency::{CurrencyError, CurrencyTool};
pub use knowledge::{KnowledgeBaseTool, KnowledgeEntry, KnowledgeFile, NO_ENTRY};
pub use live_rates::{parse_pair_response, LiveRateError, LiveRateSource};
pub use weather::WeatherTool;

/// Register the built-in tools.
pub fn register_builtin_tools(registry: &mut ToolRegistry, config: &ToolsConfig) {
    let weather = WeatherTool::new(&config.weather);
    let unit = weather.unit().to_string();
    registry.register(Arc::new(UnitValueAdapter::new(Arc::new(weather), unit)));
    registry.register(Arc::new(StandardAdapter::new(Arc::new(CalculatorTool))));
    let currency = CurrencyTool::new(&config.currency);
    tracing::debug!(live_rates = currency.has_live_source(), "currency tool configured");
    registry.register(Arc::new(StandardAdapter::new(Arc::new(currency))));
    registry.register(Arc::new(StandardAdapter::new(Arc::new(
        KnowledgeBaseTool::new(&config.knowledge_base.path),
    ))));
    tracing::debug!(tools = ?registry.names(), "built-in tools registered");
}
