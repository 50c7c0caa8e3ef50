//! Value types
//!
//! `ParamValue` is what a recognizer writes into a step, possibly still
//! holding `${name}` references. `ToolValue` is what a tool hands back and
//! what the variable scope stores.

use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Unit marker carried by weather readings.
pub const TEMPERATURE_UNIT: &str = "°C";

/// Render a number the way answers are shown to users.
///
/// Integral values keep one decimal place (`25.0`), everything else uses the
/// shortest round-trip form (`27.5`, `30.375`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Return the binding name if `text` is exactly one `${name}` placeholder.
pub fn whole_reference(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("${")?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains('}') || inner.contains("${") {
        return None;
    }
    Some(inner)
}

/// A step parameter as written by a recognizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    /// Literal text; may embed `${name}` references.
    Text(String),
    /// The whole value is the result bound under this name.
    Reference(String),
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn reference(name: impl Into<String>) -> Self {
        Self::Reference(name.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text form used when a tool wants a string.
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(text) => text.clone(),
            Self::Reference(name) => format!("${{{}}}", name),
            Self::List(items) => render_list(items.iter().map(ParamValue::render)),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        match whole_reference(value) {
            Some(name) => Self::Reference(name.to_string()),
            None => Self::Text(value.to_string()),
        }
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        match whole_reference(&value) {
            Some(name) => Self::Reference(name.to_string()),
            None => Self::Text(value),
        }
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(value: Vec<ParamValue>) -> Self {
        Self::List(value)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Reference(name) => serializer.serialize_str(&format!("${{{}}}", name)),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// A value produced by a tool.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ToolValue {
    Number(f64),
    Text(String),
    /// A reading with both a display form (`"18°C"`) and a numeric form (`18.0`).
    Dual {
        display: String,
        numeric: f64,
    },
    List(Vec<ToolValue>),
}

impl ToolValue {
    pub fn dual(display: impl Into<String>, numeric: f64) -> Self {
        Self::Dual {
            display: display.into(),
            numeric,
        }
    }

    /// Numeric view: plain numbers and the numeric half of a dual value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Dual { numeric, .. } => Some(*numeric),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// User-facing text: natural number form, or the display half of a dual value.
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Text(text) => text.clone(),
            Self::Dual { display, .. } => display.clone(),
            Self::List(items) => render_list(items.iter().map(ToolValue::render)),
        }
    }
}

impl fmt::Display for ToolValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<f64> for ToolValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for ToolValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for ToolValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

fn render_list(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}
