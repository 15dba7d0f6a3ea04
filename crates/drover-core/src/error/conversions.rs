//! From trait implementations for DroverError conversions

use super::types::DroverError;

impl From<anyhow::Error> for DroverError {
    fn from(error: anyhow::Error) -> Self {
        Self::other(format!("{:#}", error))
    }
}

impl From<std::io::Error> for DroverError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for DroverError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for DroverError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.to_string(), "Parsing TOML")
    }
}

impl From<serde_yaml::Error> for DroverError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_with_context(error.to_string(), "Parsing YAML")
    }
}
