//! Plate OCR predictor.
//!
//! Wraps a fixed-slot plate recognition model: the cropped plate is
//! converted to grayscale and resized to the model's input shape, the
//! forward pass emits `(1, slots, vocabulary)` probability rows, and greedy
//! decoding takes the argmax character per slot. Padding characters mark
//! unused slots and are stripped from the final text.
//!
//! The main components are:
//! - `PlateRecPredictor`: the predictor itself
//! - `PlateRecPredictorConfig`: configuration for the predictor
//! - `PlateRecPredictorBuilder`: builder for creating predictor instances

use crate::core::{
    AlprError, AlprResult, CommonBuilderConfig, ConfigValidator, ConfigValidatorExt, OrtInfer,
    Tensor3D,
};
use crate::domain::{OcrOutcome, PlateRecognizer};
use crate::hub::OcrModel;
use crate::processors::NormalizeImage;
use image::{DynamicImage, RgbImage, imageops};
use std::path::Path;
use tracing::debug;

/// Configuration for the plate OCR predictor.
///
/// The alphabet/slots/shape metadata defaults to the default hub preset;
/// custom models supply their own values through the builder.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PlateRecPredictorConfig {
    /// Common configuration parameters
    pub common: CommonBuilderConfig,
    /// The model's alphabet, one character per vocabulary entry
    pub alphabet: Option<String>,
    /// The alphabet symbol marking unused slots
    pub padding_char: Option<char>,
    /// Number of character slots the model emits
    pub slots: Option<usize>,
    /// Grayscale input shape as (height, width)
    pub input_shape: Option<(u32, u32)>,
}

impl PlateRecPredictorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration carrying the metadata of a hub preset.
    pub fn for_model(model: OcrModel) -> Self {
        Self {
            common: CommonBuilderConfig::new().model_name(model.as_str()),
            alphabet: Some(model.alphabet().to_string()),
            padding_char: Some(model.padding_char()),
            slots: Some(model.slots()),
            input_shape: Some(model.input_shape()),
        }
    }
}

impl ConfigValidator for PlateRecPredictorConfig {
    fn validate(&self) -> Result<(), crate::core::ConfigError> {
        self.common.validate()?;

        if let Some(alphabet) = &self.alphabet {
            if alphabet.is_empty() {
                return Err(crate::core::ConfigError::InvalidConfig {
                    message: "alphabet must not be empty".to_string(),
                });
            }
            if let Some(pad) = self.padding_char
                && !alphabet.contains(pad)
            {
                return Err(crate::core::ConfigError::InvalidConfig {
                    message: format!("padding character '{pad}' is not part of the alphabet"),
                });
            }
        }
        if let Some(slots) = self.slots {
            self.validate_positive_usize(slots, "slots")?;
        }
        if let Some((h, w)) = self.input_shape {
            self.validate_positive_usize(h as usize, "input height")?;
            self.validate_positive_usize(w as usize, "input width")?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::for_model(OcrModel::default())
    }
}

/// Plate OCR predictor.
#[derive(Debug)]
pub struct PlateRecPredictor {
    alphabet: Vec<char>,
    padding_char: char,
    slots: Option<usize>,
    input_shape: (u32, u32),
    normalize: NormalizeImage,
    infer: OrtInfer,
    model_name: String,
}

impl PlateRecPredictor {
    /// Creates a new predictor from a validated configuration and model path.
    pub fn new(config: PlateRecPredictorConfig, model_path: &Path) -> AlprResult<Self> {
        let defaults = OcrModel::default();
        let alphabet: Vec<char> = config
            .alphabet
            .unwrap_or_else(|| defaults.alphabet().to_string())
            .chars()
            .collect();
        let padding_char = config.padding_char.unwrap_or_else(|| defaults.padding_char());
        let input_shape = config.input_shape.unwrap_or_else(|| defaults.input_shape());

        let infer = OrtInfer::from_common(&config.common, model_path, None)?;
        let model_name = config
            .common
            .model_name
            .unwrap_or_else(|| "plate-ocr".to_string());

        Ok(Self {
            alphabet,
            padding_char,
            slots: config.slots,
            input_shape,
            normalize: NormalizeImage::new(),
            infer,
            model_name,
        })
    }

    /// Returns the name of the model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model's grayscale input shape as (height, width).
    pub fn input_shape(&self) -> (u32, u32) {
        self.input_shape
    }
}

impl PlateRecognizer for PlateRecPredictor {
    fn recognize(&self, plate: &RgbImage) -> Result<OcrOutcome, AlprError> {
        let (height, width) = self.input_shape;
        let gray = DynamicImage::ImageRgb8(plate.clone()).to_luma8();
        let resized = imageops::resize(&gray, width, height, imageops::FilterType::Triangle);
        let tensor = self.normalize.gray_to_tensor(&resized)?;

        let output = self.infer.infer_3d(&tensor)?;
        if let Some(slots) = self.slots
            && output.shape()[1] != slots
        {
            return Err(AlprError::invalid_input(format!(
                "model emitted {} slots, configuration expects {slots}",
                output.shape()[1]
            )));
        }

        let outcome = decode_plate(&output, &self.alphabet, self.padding_char)?;
        debug!(
            model = %self.model_name,
            text = %outcome.text,
            confidence = outcome.confidence,
            "plate recognition finished"
        );
        Ok(outcome)
    }
}

/// Greedy-decodes per-slot probability rows into a plate reading.
///
/// Each slot contributes its argmax character and probability. The padding
/// character is stripped from the text; the aggregate confidence is the
/// mean over non-padding slots and `0.0` when every slot decodes to
/// padding.
fn decode_plate(
    output: &Tensor3D,
    alphabet: &[char],
    padding_char: char,
) -> Result<OcrOutcome, AlprError> {
    let shape = output.shape();
    if shape[2] != alphabet.len() {
        return Err(AlprError::invalid_input(format!(
            "model vocabulary size {} does not match alphabet size {}",
            shape[2],
            alphabet.len()
        )));
    }

    let mut text = String::new();
    let mut char_confidences = Vec::with_capacity(shape[1]);
    let mut non_pad_sum = 0.0f32;
    let mut non_pad_count = 0usize;

    for row in output.index_axis(ndarray::Axis(0), 0).outer_iter() {
        let (best_idx, best_prob) = row.iter().enumerate().fold(
            (0usize, f32::NEG_INFINITY),
            |(bi, bp), (i, &p)| if p > bp { (i, p) } else { (bi, bp) },
        );
        let ch = alphabet[best_idx];
        char_confidences.push(best_prob);
        if ch != padding_char {
            text.push(ch);
            non_pad_sum += best_prob;
            non_pad_count += 1;
        }
    }

    let confidence = if non_pad_count == 0 {
        0.0
    } else {
        non_pad_sum / non_pad_count as f32
    };

    Ok(OcrOutcome::new(text, confidence, char_confidences))
}

/// Builder for `PlateRecPredictor`.
pub struct PlateRecPredictorBuilder {
    common: CommonBuilderConfig,
    alphabet: Option<String>,
    padding_char: Option<char>,
    slots: Option<usize>,
    input_shape: Option<(u32, u32)>,
}

impl PlateRecPredictorBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            common: CommonBuilderConfig::new(),
            alphabet: None,
            padding_char: None,
            slots: None,
            input_shape: None,
        }
    }

    /// Creates a builder preloaded with the metadata of a hub preset.
    pub fn for_model(model: OcrModel) -> Self {
        Self {
            common: CommonBuilderConfig::new().model_name(model.as_str()),
            alphabet: Some(model.alphabet().to_string()),
            padding_char: Some(model.padding_char()),
            slots: Some(model.slots()),
            input_shape: Some(model.input_shape()),
        }
    }

    /// Sets the model name.
    pub fn model_name(mut self, model_name: impl Into<String>) -> Self {
        self.common = self.common.model_name(model_name);
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn ort_session(mut self, cfg: crate::core::OrtSessionConfig) -> Self {
        self.common = self.common.ort_session(cfg);
        self
    }

    /// Sets the model alphabet, one character per vocabulary entry.
    pub fn alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.alphabet = Some(alphabet.into());
        self
    }

    /// Sets the alphabet symbol marking unused slots.
    pub fn padding_char(mut self, padding_char: char) -> Self {
        self.padding_char = Some(padding_char);
        self
    }

    /// Sets the number of character slots the model emits.
    pub fn slots(mut self, slots: usize) -> Self {
        self.slots = Some(slots);
        self
    }

    /// Sets the grayscale input shape as (height, width).
    pub fn input_shape(mut self, input_shape: (u32, u32)) -> Self {
        self.input_shape = Some(input_shape);
        self
    }

    /// Builds the `PlateRecPredictor`, validating the configuration.
    pub fn build(self, model_path: &Path) -> AlprResult<PlateRecPredictor> {
        self.build_internal(model_path)
    }

    fn build_internal(mut self, model_path: &Path) -> AlprResult<PlateRecPredictor> {
        if self.common.model_path.is_none() {
            self.common = self.common.model_path(model_path.to_path_buf());
        }

        let config = PlateRecPredictorConfig {
            common: self.common,
            alphabet: self.alphabet,
            padding_char: self.padding_char,
            slots: self.slots,
            input_shape: self.input_shape,
        };
        let config = config.validate_and_wrap()?;
        PlateRecPredictor::new(config, model_path)
    }
}

impl Default for PlateRecPredictorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
