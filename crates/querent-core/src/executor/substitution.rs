//! `${name}` substitution against the run scope
//!
//! - A whole-value reference to a dual value resolves to its numeric half
//!   when the parameter is amount-like, to its display half otherwise.
//! - References inside lists always resolve to the numeric half.
//! - References embedded in text are replaced by display text, in one pass.
//! - Any unbound name fails the whole resolution.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{ExecutionError, VariableScope};
use crate::types::{ParamValue, Parameters, ToolValue};

static EMBEDDED_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid reference pattern"));

/// Parameter names that receive the numeric half of a dual value.
pub const AMOUNT_LIKE_PARAMETERS: &[&str] = &[
    "numbers",
    "first_number",
    "second_number",
    "amount",
    "number",
    "percentage",
    "base",
    "exponent",
];

pub fn is_amount_like(name: &str) -> bool {
    AMOUNT_LIKE_PARAMETERS.iter().any(|candidate| *candidate == name)
}

/// Produce a resolved copy of `params`; the originals are left untouched.
pub fn resolve_parameters(
    params: &Parameters,
    scope: &VariableScope,
) -> Result<Parameters, ExecutionError> {
    let mut resolved = Parameters::new();
    for (name, value) in params.iter() {
        resolved.insert(name, resolve_value(name, value, scope)?);
    }
    Ok(resolved)
}

fn lookup<'a>(scope: &'a VariableScope, name: &str) -> Result<&'a ToolValue, ExecutionError> {
    scope
        .get(name)
        .ok_or_else(|| ExecutionError::UnboundVariable(name.to_string()))
}

fn resolve_value(
    name: &str,
    value: &ParamValue,
    scope: &VariableScope,
) -> Result<ParamValue, ExecutionError> {
    match value {
        ParamValue::Number(n) => Ok(ParamValue::Number(*n)),
        ParamValue::Text(text) => substitute_embedded(text, scope).map(ParamValue::Text),
        ParamValue::Reference(var) => Ok(match lookup(scope, var)? {
            ToolValue::Dual { display, numeric } => {
                if is_amount_like(name) {
                    ParamValue::Number(*numeric)
                } else {
                    ParamValue::Text(display.clone())
                }
            }
            other => to_param(other),
        }),
        ParamValue::List(items) => items
            .iter()
            .map(|item| resolve_list_item(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List),
    }
}

fn resolve_list_item(item: &ParamValue, scope: &VariableScope) -> Result<ParamValue, ExecutionError> {
    match item {
        ParamValue::Reference(var) => Ok(match lookup(scope, var)? {
            ToolValue::Dual { numeric, .. } => ParamValue::Number(*numeric),
            other => to_param(other),
        }),
        ParamValue::List(items) => items
            .iter()
            .map(|item| resolve_list_item(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(ParamValue::List),
        ParamValue::Text(text) => substitute_embedded(text, scope).map(ParamValue::Text),
        ParamValue::Number(n) => Ok(ParamValue::Number(*n)),
    }
}

fn to_param(value: &ToolValue) -> ParamValue {
    match value {
        ToolValue::Number(n) => ParamValue::Number(*n),
        ToolValue::Text(text) => ParamValue::Text(text.clone()),
        ToolValue::Dual { display, .. } => ParamValue::Text(display.clone()),
        ToolValue::List(items) => ParamValue::List(items.iter().map(to_param).collect()),
    }
}

fn substitute_embedded(text: &str, scope: &VariableScope) -> Result<String, ExecutionError> {
    if !text.contains("${") {
        return Ok(text.to_string());
    }
    for caps in EMBEDDED_REFERENCE.captures_iter(text) {
        lookup(scope, &caps[1])?;
    }
    Ok(EMBEDDED_REFERENCE
        .replace_all(text, |caps: &Captures| {
            scope.get(&caps[1]).map(ToolValue::render).unwrap_or_default()
        })
        .into_owned())
}
