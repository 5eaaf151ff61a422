//! Serializable configuration for the full pipeline.

use crate::core::{ConfigError, ConfigValidator, OrtSessionConfig};
use crate::hub::{DetectorModel, OcrModel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the detection stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorStageConfig {
    /// Hub preset to load. Ignored when `model_path` is set.
    pub model: Option<DetectorModel>,
    /// Explicit model file, bypassing the hub.
    pub model_path: Option<PathBuf>,
    /// Square input resolution; defaults to the preset's resolution.
    pub input_size: Option<u32>,
    /// Confidence threshold for keeping detections.
    pub conf_thresh: Option<f32>,
    /// ONNX Runtime session configuration for this stage.
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
}

/// Configuration for the OCR stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrStageConfig {
    /// Hub preset to load. Ignored when `model_path` is set.
    pub model: Option<OcrModel>,
    /// Explicit model file, bypassing the hub.
    pub model_path: Option<PathBuf>,
    /// Alphabet of a custom model; defaults to the preset's alphabet.
    pub alphabet: Option<String>,
    /// Padding character of a custom model.
    pub padding_char: Option<char>,
    /// Slot count of a custom model.
    pub slots: Option<usize>,
    /// Grayscale input shape (height, width) of a custom model.
    pub input_shape: Option<(u32, u32)>,
    /// Minimum aggregate OCR confidence for keeping a reading.
    pub conf_thresh: Option<f32>,
    /// ONNX Runtime session configuration for this stage.
    #[serde(default)]
    pub ort_session: Option<OrtSessionConfig>,
}

/// Configuration for the full ALPR pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlprConfig {
    /// Detection stage configuration.
    #[serde(default)]
    pub detector: DetectorStageConfig,
    /// OCR stage configuration.
    #[serde(default)]
    pub ocr: OcrStageConfig,
}

impl AlprConfig {
    /// Creates a configuration with all defaults (hub presets, CPU).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, crate::core::AlprError> {
        serde_json::from_str(json)
            .map_err(|e| crate::core::AlprError::config_error(format!("invalid JSON config: {e}")))
    }
}

impl ConfigValidator for AlprConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(thresh) = self.detector.conf_thresh {
            self.validate_f32_range(thresh, 0.0, 1.0, "detector confidence threshold")?;
        }
        if let Some(size) = self.detector.input_size {
            self.validate_positive_usize(size as usize, "detector input size")?;
        }
        if let Some(path) = &self.detector.model_path {
            self.validate_model_path(path)?;
        }

        if let Some(thresh) = self.ocr.conf_thresh {
            self.validate_f32_range(thresh, 0.0, 1.0, "OCR confidence threshold")?;
        }
        if let Some(path) = &self.ocr.model_path {
            self.validate_model_path(path)?;
        }
        if let Some(alphabet) = &self.ocr.alphabet
            && alphabet.is_empty()
        {
            return Err(ConfigError::InvalidConfig {
                message: "OCR alphabet must not be empty".to_string(),
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
    fn test_default_config_validates() {
        assert!(AlprConfig::new().validate().is_ok());
    }

    #[test]
    fn test_json_round_trip_with_presets() {
        let json = r#"
        {
            "detector": {
                "model": "yolo-v9-t-256-license-plate-end2end",
                "conf_thresh": 0.5
            },
            "ocr": {
                "model": "global-plates-mobile-vit-v2-model"
            }
        }
        "#;
        let config = AlprConfig::from_json(json).unwrap();
        assert_eq!(config.detector.model, Some(DetectorModel::YoloV9T256));
        assert_eq!(config.detector.conf_thresh, Some(0.5));
        assert_eq!(config.ocr.model, Some(OcrModel::GlobalPlatesMobileVitV2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut config = AlprConfig::new();
        config.detector.conf_thresh = Some(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_model_path_rejected() {
        let mut config = AlprConfig::new();
        config.ocr.model_path = Some(PathBuf::from("/nonexistent/ocr.onnx"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = AlprConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::core::AlprError::ConfigError { .. }));
    }
}
