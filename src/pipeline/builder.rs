//! Builder assembling the full pipeline.

use crate::core::{AlprResult, ConfigValidatorExt, OrtSessionConfig};
use crate::domain::{PlateDetector, PlateRecognizer};
use crate::hub::{DetectorModel, OcrModel};
use crate::pipeline::config::AlprConfig;
use crate::pipeline::Alpr;
use crate::predictor::{PlateDetPredictorBuilder, PlateRecPredictorBuilder};
use std::path::PathBuf;
use tracing::info;

/// Builder for the [`Alpr`] pipeline.
///
/// Stage models come from hub presets by default; explicit model paths or
/// fully custom [`PlateDetector`] / [`PlateRecognizer`] implementations
/// override them.
#[derive(Default)]
pub struct AlprBuilder {
    config: AlprConfig,
    custom_detector: Option<Box<dyn PlateDetector>>,
    custom_recognizer: Option<Box<dyn PlateRecognizer>>,
}

impl AlprBuilder {
    /// Creates a builder with default settings (default presets, CPU).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from an existing pipeline configuration.
    pub fn from_config(config: AlprConfig) -> Self {
        Self {
            config,
            custom_detector: None,
            custom_recognizer: None,
        }
    }

    /// Sets the detector hub preset.
    pub fn detector_model(mut self, model: DetectorModel) -> Self {
        self.config.detector.model = Some(model);
        self
    }

    /// Sets an explicit detector model file, bypassing the hub.
    pub fn detector_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.detector.model_path = Some(path.into());
        self
    }

    /// Sets the detector's square input resolution (required for custom
    /// model files whose resolution differs from the default).
    pub fn detector_input_size(mut self, input_size: u32) -> Self {
        self.config.detector.input_size = Some(input_size);
        self
    }

    /// Sets the detection confidence threshold.
    pub fn detector_conf_thresh(mut self, conf_thresh: f32) -> Self {
        self.config.detector.conf_thresh = Some(conf_thresh);
        self
    }

    /// Sets the ONNX Runtime session configuration for the detector.
    pub fn detector_ort_session(mut self, cfg: OrtSessionConfig) -> Self {
        self.config.detector.ort_session = Some(cfg);
        self
    }

    /// Sets the OCR hub preset.
    pub fn ocr_model(mut self, model: OcrModel) -> Self {
        self.config.ocr.model = Some(model);
        self
    }

    /// Sets an explicit OCR model file, bypassing the hub.
    pub fn ocr_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.ocr.model_path = Some(path.into());
        self
    }

    /// Sets the alphabet of a custom OCR model.
    pub fn ocr_alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.config.ocr.alphabet = Some(alphabet.into());
        self
    }

    /// Sets the padding character of a custom OCR model.
    pub fn ocr_padding_char(mut self, padding_char: char) -> Self {
        self.config.ocr.padding_char = Some(padding_char);
        self
    }

    /// Sets the slot count of a custom OCR model.
    pub fn ocr_slots(mut self, slots: usize) -> Self {
        self.config.ocr.slots = Some(slots);
        self
    }

    /// Sets the grayscale input shape (height, width) of a custom OCR model.
    pub fn ocr_input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.config.ocr.input_shape = Some(input_shape);
        self
    }

    /// Sets the minimum aggregate OCR confidence for keeping a reading.
    pub fn ocr_conf_thresh(mut self, conf_thresh: f32) -> Self {
        self.config.ocr.conf_thresh = Some(conf_thresh);
        self
    }

    /// Sets the ONNX Runtime session configuration for the OCR stage.
    pub fn ocr_ort_session(mut self, cfg: OrtSessionConfig) -> Self {
        self.config.ocr.ort_session = Some(cfg);
        self
    }

    /// Replaces the detection stage with a custom implementation.
    pub fn detector(mut self, detector: Box<dyn PlateDetector>) -> Self {
        self.custom_detector = Some(detector);
        self
    }

    /// Replaces the OCR stage with a custom implementation.
    pub fn recognizer(mut self, recognizer: Box<dyn PlateRecognizer>) -> Self {
        self.custom_recognizer = Some(recognizer);
        self
    }

    /// Builds the pipeline, resolving hub presets and loading both models.
    pub fn build(self) -> AlprResult<Alpr> {
        let config = self.config.validate_and_wrap()?;
        let ocr_conf_thresh = config.ocr.conf_thresh.unwrap_or(0.0);

        let detector: Box<dyn PlateDetector> = match self.custom_detector {
            Some(detector) => detector,
            None => Box::new(build_detector(&config)?),
        };
        let recognizer: Box<dyn PlateRecognizer> = match self.custom_recognizer {
            Some(recognizer) => recognizer,
            None => Box::new(build_recognizer(&config)?),
        };

        Ok(Alpr::from_parts(detector, recognizer, ocr_conf_thresh))
    }
}

impl std::fmt::Debug for AlprBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlprBuilder")
            .field("config", &self.config)
            .field("custom_detector", &self.custom_detector.is_some())
            .field("custom_recognizer", &self.custom_recognizer.is_some())
            .finish()
    }
}

fn build_detector(config: &AlprConfig) -> AlprResult<crate::predictor::PlateDetPredictor> {
    let preset = config.detector.model.unwrap_or_default();
    let mut builder = PlateDetPredictorBuilder::new();
    let (model_path, default_input_size) = match &config.detector.model_path {
        Some(path) => (path.clone(), None),
        None => {
            builder = builder.model_name(preset.as_str());
            (preset.resolve()?, Some(preset.input_size()))
        }
    };

    if let Some(size) = config.detector.input_size.or(default_input_size) {
        builder = builder.input_size(size);
    }
    if let Some(thresh) = config.detector.conf_thresh {
        builder = builder.conf_thresh(thresh);
    }
    if let Some(ort) = &config.detector.ort_session {
        builder = builder.ort_session(ort.clone());
    }

    info!(model = %model_path.display(), "loading plate detection model");
    builder.build(&model_path)
}

fn build_recognizer(config: &AlprConfig) -> AlprResult<crate::predictor::PlateRecPredictor> {
    let preset = config.ocr.model.unwrap_or_default();
    let model_path = match &config.ocr.model_path {
        Some(path) => path.clone(),
        None => preset.resolve()?,
    };

    let mut builder = PlateRecPredictorBuilder::for_model(preset);
    if let Some(alphabet) = &config.ocr.alphabet {
        builder = builder.alphabet(alphabet.clone());
    }
    if let Some(padding_char) = config.ocr.padding_char {
        builder = builder.padding_char(padding_char);
    }
    if let Some(slots) = config.ocr.slots {
        builder = builder.slots(slots);
    }
    if let Some(input_shape) = config.ocr.input_shape {
        builder = builder.input_shape(input_shape);
    }
    if let Some(ort) = &config.ocr.ort_session {
        builder = builder.ort_session(ort.clone());
    }

    info!(model = %model_path.display(), "loading plate OCR model");
    builder.build(&model_path)
}
