//! `${name}` prompt templating

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use super::inputs::{AgentInputs, InputConfig};
use crate::error::{DroverError, DroverResult};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("valid placeholder regex"));

/// Names referenced by `${name}` placeholders, in order of first appearance
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Substitute `${name}` placeholders with input values.
///
/// Strings are inserted verbatim, other values as compact JSON. Declared
/// inputs that were not supplied render as an empty string; placeholders
/// naming undeclared inputs are a validation error.
pub fn render_template(template: &str, inputs: &AgentInputs, config: &InputConfig) -> DroverResult<String> {
    if let Some(unknown) = placeholders(template)
        .into_iter()
        .find(|name| !config.inputs.contains_key(name) && inputs.get(name).is_none())
    {
        return Err(DroverError::validation_field(
            format!("template references undeclared input '{}'", unknown),
            unknown,
        ));
    }

    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        match inputs.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    });
    Ok(rendered.into_owned())
}
