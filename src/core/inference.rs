//! ONNX Runtime inference engine shared by the detector and recognizer.
//!
//! A thin wrapper around an `ort` session that owns the input/output tensor
//! names, applies the session configuration (threads, optimization level,
//! execution providers), and exposes typed inference entry points.

use crate::core::config::{
    CommonBuilderConfig, OrtExecutionProvider, OrtGraphOptimizationLevel, OrtSessionConfig,
};
use crate::core::errors::{AlprError, SimpleError};
use crate::core::tensor::{Tensor3D, Tensor4D};
use ndarray::Array3;
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::value::TensorRef;
use std::path::Path;
use std::sync::Mutex;

/// ONNX Runtime inference engine for a single model.
///
/// The session sits behind a `Mutex` because running a session requires
/// mutable access; concurrent predictions serialize on it.
pub struct OrtInfer {
    session: Mutex<Session>,
    input_name: String,
    output_name: Option<String>,
    model_path: std::path::PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new OrtInfer instance with default ONNX Runtime settings.
    ///
    /// The model's first input tensor name is used unless `input_name` is
    /// given.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> Result<Self, AlprError> {
        let builder = Session::builder()?.with_log_level(LogLevel::Error)?;
        Self::from_builder(builder, model_path.as_ref(), None, input_name)
    }

    /// Creates a new OrtInfer instance from a common builder config, applying
    /// the ORT session configuration when present.
    pub fn from_common(
        common: &CommonBuilderConfig,
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
    ) -> Result<Self, AlprError> {
        let builder = Session::builder()?;
        let builder = if let Some(cfg) = &common.ort_session {
            Self::apply_ort_config(builder, cfg)?
        } else {
            builder.with_log_level(LogLevel::Error)?
        };
        Self::from_builder(
            builder,
            model_path.as_ref(),
            common.model_name.clone(),
            input_name,
        )
    }

    fn from_builder(
        builder: SessionBuilder,
        path: &Path,
        model_name: Option<String>,
        input_name: Option<&str>,
    ) -> Result<Self, AlprError> {
        let session = builder.commit_from_file(path).map_err(|e| {
            AlprError::model_load_error(
                path,
                "failed to create ONNX session",
                Some(e),
            )
        })?;

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => session
                .inputs
                .first()
                .map(|i| i.name.clone())
                .ok_or_else(|| {
                    AlprError::invalid_input("model has no input tensors")
                })?,
        };

        let model_name = model_name
            .or_else(|| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_string())
            })
            .unwrap_or_else(|| "unknown_model".to_string());

        Ok(OrtInfer {
            session: Mutex::new(session),
            input_name,
            output_name: None,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Applies an [`OrtSessionConfig`] to a session builder.
    ///
    /// Every configured execution provider is registered with
    /// `error_on_failure`, so requesting a backend that is unavailable at
    /// runtime fails session creation instead of silently falling back to
    /// CPU.
    fn apply_ort_config(
        builder: SessionBuilder,
        cfg: &OrtSessionConfig,
    ) -> Result<SessionBuilder, AlprError> {
        let mut builder = builder.with_log_level(LogLevel::Error)?;

        if let Some(threads) = cfg.intra_threads {
            builder = builder.with_intra_threads(threads)?;
        }
        if let Some(threads) = cfg.inter_threads {
            builder = builder.with_inter_threads(threads)?;
        }
        if let Some(enabled) = cfg.parallel_execution {
            builder = builder.with_parallel_execution(enabled)?;
        }
        if let Some(enabled) = cfg.enable_mem_pattern {
            builder = builder.with_memory_pattern(enabled)?;
        }
        if let Some(level) = cfg.optimization_level {
            builder = builder.with_optimization_level(convert_optimization_level(level))?;
        }
        if let Some(providers) = &cfg.execution_providers {
            let dispatches: Vec<ExecutionProviderDispatch> = providers
                .iter()
                .map(dispatch_execution_provider)
                .collect::<Result<_, _>>()?;
            builder = builder.with_execution_providers(dispatches)?;
        }

        Ok(builder)
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self) -> Result<String, AlprError> {
        if let Some(ref name) = self.output_name {
            Ok(name.clone())
        } else {
            let session = self.session.lock().map_err(|_| AlprError::InvalidInput {
                message: "failed to acquire session lock".to_string(),
            })?;
            if let Some(output) = session.outputs.first() {
                Ok(output.name.clone())
            } else {
                Err(AlprError::InvalidInput {
                    message: "no outputs available in session".to_string(),
                })
            }
        }
    }

    fn run_inference_with_processor<T>(
        &self,
        x: &Tensor4D,
        processor: impl FnOnce(&[i64], &[f32]) -> Result<T, AlprError>,
    ) -> Result<T, AlprError> {
        let input_shape = x.shape().to_vec();

        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            AlprError::inference_error(
                &self.model_name,
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            AlprError::inference_error(
                &self.model_name,
                "failed to acquire session lock",
                SimpleError::new("poisoned session lock"),
            )
        })?;

        let outputs = session.run(inputs).map_err(|e| {
            AlprError::inference_error(
                &self.model_name,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                AlprError::inference_error(
                    &self.model_name,
                    &format!("failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        processor(output_shape, output_data)
    }

    /// Runs inference expecting a 3D output tensor.
    ///
    /// Both pipeline stages use this shape: the detector emits
    /// `(batch, max_detections, 6)` rows and the recognizer emits
    /// `(batch, slots, vocabulary)` probability rows.
    pub fn infer_3d(&self, x: &Tensor4D) -> Result<Tensor3D, AlprError> {
        self.run_inference_with_processor(x, |output_shape, output_data| {
            if output_shape.len() != 3 {
                return Err(AlprError::invalid_input(format!(
                    "expected 3D output tensor, got {}D with shape {:?}",
                    output_shape.len(),
                    output_shape
                )));
            }
            let shape = (
                output_shape[0] as usize,
                output_shape[1] as usize,
                output_shape[2] as usize,
            );
            Array3::from_shape_vec(shape, output_data.to_vec()).map_err(|e| {
                AlprError::tensor_operation("failed to reshape 3D inference output", e)
            })
        })
    }
}

fn convert_optimization_level(level: OrtGraphOptimizationLevel) -> GraphOptimizationLevel {
    match level {
        OrtGraphOptimizationLevel::DisableAll => GraphOptimizationLevel::Disable,
        OrtGraphOptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
        OrtGraphOptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
        OrtGraphOptimizationLevel::Level3 | OrtGraphOptimizationLevel::All => {
            GraphOptimizationLevel::Level3
        }
    }
}

/// Converts a configured execution provider into an ort dispatch entry.
///
/// Providers whose cargo feature is not enabled produce a configuration
/// error rather than being skipped.
fn dispatch_execution_provider(
    provider: &OrtExecutionProvider,
) -> Result<ExecutionProviderDispatch, AlprError> {
    match provider {
        OrtExecutionProvider::CPU => Ok(CPUExecutionProvider::default().build()),
        #[cfg(feature = "cuda")]
        OrtExecutionProvider::CUDA { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            let mut ep = CUDAExecutionProvider::default();
            if let Some(id) = device_id {
                ep = ep.with_device_id(*id);
            }
            Ok(ep.build().error_on_failure())
        }
        #[cfg(not(feature = "cuda"))]
        OrtExecutionProvider::CUDA { .. } => Err(AlprError::config_error(
            "CUDA execution provider requested but the `cuda` feature is not enabled",
        )),
        #[cfg(feature = "openvino")]
        OrtExecutionProvider::OpenVINO {
            device_type,
            num_threads,
        } => {
            use ort::execution_providers::OpenVINOExecutionProvider;
            let mut ep = OpenVINOExecutionProvider::default();
            if let Some(device) = device_type {
                ep = ep.with_device_type(device.clone());
            }
            if let Some(threads) = num_threads {
                ep = ep.with_num_threads(*threads);
            }
            Ok(ep.build().error_on_failure())
        }
        #[cfg(not(feature = "openvino"))]
        OrtExecutionProvider::OpenVINO { .. } => Err(AlprError::config_error(
            "OpenVINO execution provider requested but the `openvino` feature is not enabled",
        )),
        #[cfg(feature = "directml")]
        OrtExecutionProvider::DirectML { device_id } => {
            use ort::execution_providers::DirectMLExecutionProvider;
            let mut ep = DirectMLExecutionProvider::default();
            if let Some(id) = device_id {
                ep = ep.with_device_id(*id);
            }
            Ok(ep.build().error_on_failure())
        }
        #[cfg(not(feature = "directml"))]
        OrtExecutionProvider::DirectML { .. } => Err(AlprError::config_error(
            "DirectML execution provider requested but the `directml` feature is not enabled",
        )),
        #[cfg(feature = "qnn")]
        OrtExecutionProvider::QNN { backend_path } => {
            use ort::execution_providers::QNNExecutionProvider;
            let mut ep = QNNExecutionProvider::default();
            if let Some(path) = backend_path {
                ep = ep.with_backend_path(path.clone());
            }
            Ok(ep.build().error_on_failure())
        }
        #[cfg(not(feature = "qnn"))]
        OrtExecutionProvider::QNN { .. } => Err(AlprError::config_error(
            "QNN execution provider requested but the `qnn` feature is not enabled",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_provider_always_dispatches() {
        assert!(dispatch_execution_provider(&OrtExecutionProvider::CPU).is_ok());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn test_unavailable_backend_is_config_error() {
        let err =
            dispatch_execution_provider(&OrtExecutionProvider::CUDA { device_id: None })
                .unwrap_err();
        assert!(matches!(err, AlprError::ConfigError { .. }));
    }

    #[test]
    fn test_optimization_level_conversion_covers_all() {
        for level in [
            OrtGraphOptimizationLevel::DisableAll,
            OrtGraphOptimizationLevel::Level1,
            OrtGraphOptimizationLevel::Level2,
            OrtGraphOptimizationLevel::Level3,
            OrtGraphOptimizationLevel::All,
        ] {
            let _ = convert_optimization_level(level);
        }
    }
}
