//! Configuration error types and validation traits.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a model path does not exist.
    #[error("model path does not exist: {path}")]
    ModelPathNotFound { path: std::path::PathBuf },

    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Error indicating that validation failed.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },
}

/// A trait for validating configuration parameters.
///
/// This trait provides methods for validating configuration parameters used
/// in the ALPR pipeline, such as thresholds, model paths, and image
/// dimensions.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates a model path.
    ///
    /// This method checks that the model path exists and is a file.
    fn validate_model_path(&self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ModelPathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::InvalidConfig {
                message: format!("model path is not a file: {}", path.display()),
            });
        }
        Ok(())
    }

    /// Validates that a float lies within an inclusive range.
    fn validate_f32_range(
        &self,
        value: f32,
        min: f32,
        max: f32,
        name: &str,
    ) -> Result<(), ConfigError> {
        if value < min || value > max || value.is_nan() {
            return Err(ConfigError::InvalidConfig {
                message: format!("{name} must be between {min} and {max}, got {value}"),
            });
        }
        Ok(())
    }

    /// Validates that a float is strictly positive.
    fn validate_positive_f32(&self, value: f32, name: &str) -> Result<(), ConfigError> {
        if value <= 0.0 || value.is_nan() {
            return Err(ConfigError::InvalidConfig {
                message: format!("{name} must be greater than 0, got {value}"),
            });
        }
        Ok(())
    }

    /// Validates that an integer is strictly positive.
    fn validate_positive_usize(&self, value: usize, name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!("{name} must be greater than 0"),
            });
        }
        Ok(())
    }
}

/// Extension trait for validating a configuration and converting the error
/// into the crate-wide error type in one step.
pub trait ConfigValidatorExt: ConfigValidator + Sized {
    /// Validates the configuration, wrapping any failure into an AlprError.
    fn validate_and_wrap(self) -> Result<Self, crate::core::AlprError> {
        self.validate()
            .map_err(|e| crate::core::AlprError::config_error(e.to_string()))?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;

    impl ConfigValidator for Dummy {
        fn validate(&self) -> Result<(), ConfigError> {
            Ok(())
        }

        fn get_defaults() -> Self {
            Dummy
        }
    }

    #[test]
    fn test_f32_range_validation() {
        let dummy = Dummy;
        assert!(dummy.validate_f32_range(0.4, 0.0, 1.0, "threshold").is_ok());
        assert!(dummy.validate_f32_range(1.5, 0.0, 1.0, "threshold").is_err());
        assert!(
            dummy
                .validate_f32_range(f32::NAN, 0.0, 1.0, "threshold")
                .is_err()
        );
    }

    #[test]
    fn test_positive_usize_validation() {
        let dummy = Dummy;
        assert!(dummy.validate_positive_usize(7, "slots").is_ok());
        assert!(dummy.validate_positive_usize(0, "slots").is_err());
    }

    #[test]
    fn test_missing_model_path() {
        let dummy = Dummy;
        let err = dummy
            .validate_model_path(Path::new("/nonexistent/model.onnx"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ModelPathNotFound { .. }));
    }
}
