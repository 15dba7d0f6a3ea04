//! Declared agent inputs and their validation

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DroverError, DroverResult};
use crate::tools::ToolParameter;

/// JSON type of a declared input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl InputType {
    /// JSON schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::String => "string",
            InputType::Number => "number",
            InputType::Integer => "integer",
            InputType::Boolean => "boolean",
            InputType::Array => "array",
            InputType::Object => "object",
        }
    }

    /// Whether `value` has this type
    pub fn accepts(&self, value: &Value) -> bool {
        crate::tools::json_type_matches(self.as_str(), value)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_required() -> bool {
    true
}

/// One declared input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub input_type: InputType,
    #[serde(default = "default_required")]
    pub required: bool,
}

impl InputSpec {
    /// Create a required input
    pub fn required(input_type: InputType, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            input_type,
            required: true,
        }
    }

    /// Create an optional input
    pub fn optional(input_type: InputType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(input_type, description)
        }
    }
}

/// Declared inputs keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub inputs: BTreeMap<String, InputSpec>,
}

impl InputConfig {
    /// Add an input declaration
    pub fn with_input(mut self, name: impl Into<String>, spec: InputSpec) -> Self {
        self.inputs.insert(name.into(), spec);
        self
    }

    /// Inputs as tool parameters, for the subagent tool schema
    pub fn to_parameters(&self) -> Vec<ToolParameter> {
        self.inputs
            .iter()
            .map(|(name, spec)| {
                let param = ToolParameter::of_type(name.clone(), spec.description.clone(), spec.input_type.as_str());
                if spec.required { param } else { param.optional() }
            })
            .collect()
    }
}

/// Values supplied for an agent's declared inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentInputs(Map<String, Value>);

impl AgentInputs {
    /// Create empty inputs
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Build inputs from a JSON object; `null` means no inputs
    pub fn from_value(value: Value) -> DroverResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(DroverError::validation(format!(
                "agent inputs must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Look up a value
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inputs as a JSON object
    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Check the inputs against the declared schema
    ///
    /// Rejects missing required inputs, type mismatches and undeclared names.
    pub fn validate(&self, config: &InputConfig) -> DroverResult<()> {
        for (name, spec) in &config.inputs {
            match self.0.get(name) {
                None | Some(Value::Null) if spec.required => {
                    return Err(DroverError::validation_field(
                        format!("missing required input '{}'", name),
                        name.clone(),
                    ));
                }
                None | Some(Value::Null) => {}
                Some(value) if !spec.input_type.accepts(value) => {
                    return Err(DroverError::validation_field(
                        format!("input '{}' must be of type {}", name, spec.input_type),
                        name.clone(),
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = self.0.keys().find(|name| !config.inputs.contains_key(*name)) {
            return Err(DroverError::validation_field(
                format!("unknown input '{}'", unknown),
                unknown.clone(),
            ));
        }

        Ok(())
    }
}

impl From<Map<String, Value>> for AgentInputs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
