//! Configuration management for the ALPR pipeline.
//!
//! This module provides configuration types, validation traits, and ONNX
//! Runtime session settings shared by both pipeline stages.

pub mod builder;
pub mod errors;
pub mod onnx;

pub use builder::CommonBuilderConfig;
pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use onnx::{OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig};
