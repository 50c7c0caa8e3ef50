//! Core type definitions
//!
//! - Plan: the compiled form of one question
//! - Step: one tool invocation inside a Plan
//! - ParamValue / ToolValue: values going into and coming out of tools

mod plan;
mod step;
mod value;

pub use plan::{IntentKind, Plan};
pub use step::{Parameters, Step};
pub use value::{format_number, whole_reference, ParamValue, ToolValue, TEMPERATURE_UNIT};
