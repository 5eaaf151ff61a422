//! Plate detection predictor.
//!
//! Wraps an end-to-end (NMS-fused) YOLO license-plate detector: the frame is
//! letterboxed to the model's square input, the forward pass emits
//! `(1, max_detections, 6)` rows of `[x1, y1, x2, y2, score, class]` in
//! letterbox coordinates, and post-processing filters by confidence and maps
//! the surviving boxes back onto the original image.
//!
//! The main components are:
//! - `PlateDetPredictor`: the predictor itself
//! - `PlateDetPredictorConfig`: configuration for the predictor
//! - `PlateDetPredictorBuilder`: builder for creating predictor instances

use crate::core::{
    AlprError, AlprResult, CommonBuilderConfig, ConfigValidator, ConfigValidatorExt, OrtInfer,
    Tensor3D,
};
use crate::domain::{PlateDetection, PlateDetector};
use crate::processors::{BoundingBox, Letterbox, LetterboxTransform, NormalizeImage};
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Default confidence threshold for keeping a detection.
const DEFAULT_CONF_THRESH: f32 = 0.4;

/// Default square input resolution when the config does not set one.
const DEFAULT_INPUT_SIZE: u32 = 384;

/// Number of values per detection row emitted by the end-to-end export.
const DETECTION_ROW_LEN: usize = 6;

/// Configuration for the plate detection predictor.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PlateDetPredictorConfig {
    /// Common configuration parameters
    pub common: CommonBuilderConfig,
    /// Confidence threshold for keeping detections
    pub conf_thresh: Option<f32>,
    /// Square input resolution of the model
    pub input_size: Option<u32>,
}

impl PlateDetPredictorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigValidator for PlateDetPredictorConfig {
    fn validate(&self) -> Result<(), crate::core::ConfigError> {
        self.common.validate()?;

        if let Some(thresh) = self.conf_thresh {
            self.validate_f32_range(thresh, 0.0, 1.0, "confidence threshold")?;
        }
        if let Some(size) = self.input_size {
            self.validate_positive_usize(size as usize, "input size")?;
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self {
            common: CommonBuilderConfig::new(),
            conf_thresh: Some(DEFAULT_CONF_THRESH),
            input_size: Some(DEFAULT_INPUT_SIZE),
        }
    }
}

/// Plate detection predictor.
#[derive(Debug)]
pub struct PlateDetPredictor {
    conf_thresh: f32,
    letterbox: Letterbox,
    normalize: NormalizeImage,
    infer: OrtInfer,
    model_name: String,
}

impl PlateDetPredictor {
    /// Creates a new predictor from a validated configuration and model path.
    pub fn new(config: PlateDetPredictorConfig, model_path: &Path) -> AlprResult<Self> {
        let conf_thresh = config.conf_thresh.unwrap_or(DEFAULT_CONF_THRESH);
        let input_size = config.input_size.unwrap_or(DEFAULT_INPUT_SIZE);

        let letterbox = Letterbox::new(input_size)?;
        let normalize = NormalizeImage::new();
        let infer = OrtInfer::from_common(&config.common, model_path, None)?;
        let model_name = config
            .common
            .model_name
            .unwrap_or_else(|| "plate-detection".to_string());

        Ok(Self {
            conf_thresh,
            letterbox,
            normalize,
            infer,
            model_name,
        })
    }

    /// Returns the name of the model.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the confidence threshold.
    pub fn conf_thresh(&self) -> f32 {
        self.conf_thresh
    }

    /// Sets the confidence threshold for keeping detections.
    pub fn set_conf_thresh(&mut self, conf_thresh: f32) {
        self.conf_thresh = conf_thresh;
    }
}

impl PlateDetector for PlateDetPredictor {
    fn detect(&self, image: &RgbImage) -> Result<Vec<PlateDetection>, AlprError> {
        let (canvas, transform) = self.letterbox.apply(image)?;
        let tensor = self.normalize.rgb_to_tensor(&canvas)?;
        let output = self.infer.infer_3d(&tensor)?;
        let detections = parse_detections(&output, &transform, self.conf_thresh)?;
        debug!(
            model = %self.model_name,
            detections = detections.len(),
            "plate detection finished"
        );
        Ok(detections)
    }
}

/// Parses raw end-to-end detector output into plate detections.
///
/// Rows below `conf_thresh` are dropped; the remaining rows keep the
/// detector's own ordering. Box coordinates are mapped from letterbox space
/// back onto the source image and clamped to its bounds.
fn parse_detections(
    output: &Tensor3D,
    transform: &LetterboxTransform,
    conf_thresh: f32,
) -> Result<Vec<PlateDetection>, AlprError> {
    let shape = output.shape();
    if shape[2] != DETECTION_ROW_LEN {
        return Err(AlprError::invalid_input(format!(
            "expected detection rows of {DETECTION_ROW_LEN} values, got {} (output shape {shape:?})",
            shape[2]
        )));
    }

    let mut detections = Vec::new();
    for row in output.index_axis(ndarray::Axis(0), 0).outer_iter() {
        let score = row[4];
        if score < conf_thresh {
            continue;
        }
        let (x1, y1) = transform.unmap(row[0], row[1]);
        let (x2, y2) = transform.unmap(row[2], row[3]);
        detections.push(PlateDetection::new(
            BoundingBox::from_coords(x1, y1, x2, y2),
            score,
        ));
    }
    Ok(detections)
}

/// Builder for `PlateDetPredictor`.
pub struct PlateDetPredictorBuilder {
    common: CommonBuilderConfig,
    conf_thresh: Option<f32>,
    input_size: Option<u32>,
}

impl PlateDetPredictorBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            common: CommonBuilderConfig::new(),
            conf_thresh: None,
            input_size: None,
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

    /// Sets the confidence threshold for keeping detections.
    pub fn conf_thresh(mut self, conf_thresh: f32) -> Self {
        self.conf_thresh = Some(conf_thresh);
        self
    }

    /// Sets the square input resolution of the model.
    pub fn input_size(mut self, input_size: u32) -> Self {
        self.input_size = Some(input_size);
        self
    }

    /// Builds the `PlateDetPredictor`, validating the configuration.
    pub fn build(self, model_path: &Path) -> AlprResult<PlateDetPredictor> {
        self.build_internal(model_path)
    }

    fn build_internal(mut self, model_path: &Path) -> AlprResult<PlateDetPredictor> {
        if self.common.model_path.is_none() {
            self.common = self.common.model_path(model_path.to_path_buf());
        }

        let config = PlateDetPredictorConfig {
            common: self.common,
            conf_thresh: self.conf_thresh,
            input_size: self.input_size,
        };
        let config = config.validate_and_wrap()?;
        PlateDetPredictor::new(config, model_path)
    }
}

impl Default for PlateDetPredictorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn identity_transform(width: u32, height: u32) -> LetterboxTransform {
        LetterboxTransform {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            src_width: width,
            src_height: height,
        }
    }

    #[test]
    fn test_parse_keeps_rows_above_threshold_in_order() {
        let output = Array3::from_shape_vec(
            (1, 3, 6),
            vec![
                10.0, 10.0, 50.0, 30.0, 0.9, 0.0, // kept
                60.0, 12.0, 90.0, 28.0, 0.3, 0.0, // dropped
                100.0, 40.0, 150.0, 70.0, 0.6, 0.0, // kept
            ],
        )
        .unwrap();
        let detections =
            parse_detections(&output, &identity_transform(384, 384), 0.4).unwrap();
        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].confidence, 0.9);
        assert_eq!(detections[1].confidence, 0.6);
        assert_eq!(
            detections[1].bounding_box,
            BoundingBox::from_coords(100.0, 40.0, 150.0, 70.0)
        );
    }

    #[test]
    fn test_parse_unmaps_letterbox_coordinates() {
        // Source 768x384 scaled by 0.5 onto a 384 canvas with 96px of
        // vertical padding.
        let transform = LetterboxTransform {
            scale: 0.5,
            pad_x: 0.0,
            pad_y: 96.0,
            src_width: 768,
            src_height: 384,
        };
        let output = Array3::from_shape_vec(
            (1, 1, 6),
            vec![100.0, 116.0, 200.0, 156.0, 0.8, 0.0],
        )
        .unwrap();
        let detections = parse_detections(&output, &transform, 0.4).unwrap();
        assert_eq!(
            detections[0].bounding_box,
            BoundingBox::from_coords(200.0, 40.0, 400.0, 120.0)
        );
    }

    #[test]
    fn test_parse_clamps_boxes_to_source_bounds() {
        let output = Array3::from_shape_vec(
            (1, 1, 6),
            vec![-10.0, -5.0, 400.0, 400.0, 0.9, 0.0],
        )
        .unwrap();
        let detections =
            parse_detections(&output, &identity_transform(300, 200), 0.4).unwrap();
        assert_eq!(
            detections[0].bounding_box,
            BoundingBox::from_coords(0.0, 0.0, 300.0, 200.0)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_rows() {
        let output = Array3::zeros((1, 2, 5));
        let err =
            parse_detections(&output, &identity_transform(384, 384), 0.4).unwrap_err();
        assert!(matches!(err, AlprError::InvalidInput { .. }));
    }

    #[test]
    fn test_parse_empty_output() {
        let output = Array3::zeros((1, 0, 6));
        let detections =
            parse_detections(&output, &identity_transform(384, 384), 0.4).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn test_config_rejects_out_of_range_threshold() {
        let config = PlateDetPredictorConfig {
            conf_thresh: Some(1.5),
            ..PlateDetPredictorConfig::new()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_defaults_validate() {
        assert!(PlateDetPredictorConfig::get_defaults().validate().is_ok());
    }
}
