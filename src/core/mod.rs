//! Core building blocks: error handling, configuration, and ONNX inference.

pub mod config;
pub mod errors;
pub mod inference;
pub mod tensor;

pub use config::{
    CommonBuilderConfig, ConfigError, ConfigValidator, ConfigValidatorExt, OrtExecutionProvider,
    OrtGraphOptimizationLevel, OrtSessionConfig,
};
pub use errors::{AlprError, AlprResult, ProcessingStage, SimpleError};
pub use inference::OrtInfer;
pub use tensor::{Tensor2D, Tensor3D, Tensor4D};
