//! Common builder configuration types shared by the predictor builders.

use super::errors::{ConfigError, ConfigValidator};
use super::onnx::OrtSessionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Common configuration for model builders.
///
/// This struct contains configuration options that are common across the
/// detector and recognizer builders in the ALPR pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonBuilderConfig {
    /// The path to the model file (optional).
    pub model_path: Option<PathBuf>,
    /// The name of the model (optional).
    pub model_name: Option<String>,
    /// ONNX Runtime session configuration for this model (optional)
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
}

impl CommonBuilderConfig {
    /// Creates a new CommonBuilderConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CommonBuilderConfig with a default model name.
    pub fn with_defaults(model_name: Option<String>) -> Self {
        Self {
            model_path: None,
            model_name,
            ort_session: None,
        }
    }

    /// Sets the model path for the configuration.
    pub fn model_path(mut self, model_path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(model_path.into());
        self
    }

    /// Sets the model name for the configuration.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    /// Sets the ORT session configuration.
    pub fn ort_session(mut self, cfg: OrtSessionConfig) -> Self {
        self.ort_session = Some(cfg);
        self
    }
}

impl ConfigValidator for CommonBuilderConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.model_path {
            self.validate_model_path(path)?;
        }
        if let Some(name) = &self.model_name
            && name.trim().is_empty()
        {
            return Err(ConfigError::InvalidConfig {
                message: "model name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_config_builder_chain() {
        let config = CommonBuilderConfig::new()
            .model_name("plate-detector")
            .ort_session(OrtSessionConfig::new().with_intra_threads(2));
        assert_eq!(config.model_name.as_deref(), Some("plate-detector"));
        assert!(config.ort_session.is_some());
    }

    #[test]
    fn test_empty_model_name_rejected() {
        let config = CommonBuilderConfig::new().model_name("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unset_fields_validate() {
        assert!(CommonBuilderConfig::new().validate().is_ok());
    }
}
