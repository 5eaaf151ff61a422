//! The two-stage ALPR pipeline.
//!
//! [`Alpr`] composes a plate detector and a plate recognizer: one detector
//! pass per image, one crop and one OCR pass per detected region, results
//! assembled in detector order. The pipeline is stateless across calls
//! apart from the loaded model sessions.

mod builder;
mod config;

pub use builder::AlprBuilder;
pub use config::{AlprConfig, DetectorStageConfig, OcrStageConfig};

use crate::core::AlprResult;
use crate::domain::{AlprOutput, ErrorMetrics, PlateDetector, PlateRecognizer, PlateResult};
use crate::processors::crop_box;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, warn};

/// The assembled ALPR pipeline.
#[derive(Debug)]
pub struct Alpr {
    detector: Box<dyn PlateDetector>,
    recognizer: Box<dyn PlateRecognizer>,
    ocr_conf_thresh: f32,
}

impl Alpr {
    /// Returns a builder for configuring a pipeline.
    pub fn builder() -> AlprBuilder {
        AlprBuilder::new()
    }

    /// Builds a pipeline from a configuration with default stage
    /// implementations.
    pub fn from_config(config: AlprConfig) -> AlprResult<Self> {
        AlprBuilder::from_config(config).build()
    }

    pub(crate) fn from_parts(
        detector: Box<dyn PlateDetector>,
        recognizer: Box<dyn PlateRecognizer>,
        ocr_conf_thresh: f32,
    ) -> Self {
        Self {
            detector,
            recognizer,
            ocr_conf_thresh,
        }
    }

    /// Runs the pipeline on one image.
    ///
    /// Returns one [`PlateResult`] per detected region, in the order the
    /// detector produced them. An image without plates yields an empty
    /// output. A region whose crop degenerates at the image edge, whose OCR
    /// reading is empty, or whose reading falls below the OCR confidence
    /// threshold is kept with `ocr: None` rather than filtered out; an OCR
    /// error on one crop likewise degrades only that element.
    pub fn predict(&self, image: &RgbImage) -> AlprResult<AlprOutput> {
        let detections = self.detector.detect(image)?;
        let mut metrics = ErrorMetrics {
            total_detections: detections.len(),
            ..ErrorMetrics::new()
        };

        let mut plates = Vec::with_capacity(detections.len());
        for detection in detections {
            let ocr = match crop_box(image, &detection.bounding_box)? {
                None => {
                    metrics.failed_crops += 1;
                    debug!(bbox = %detection.bounding_box, "plate crop degenerated at image edge");
                    None
                }
                Some(plate_crop) => match self.recognizer.recognize(&plate_crop) {
                    Ok(outcome)
                        if !outcome.text.is_empty()
                            && outcome.confidence >= self.ocr_conf_thresh =>
                    {
                        Some(outcome)
                    }
                    Ok(_) => {
                        metrics.failed_recognitions += 1;
                        None
                    }
                    Err(err) => {
                        metrics.failed_recognitions += 1;
                        warn!(error = %err, "plate OCR failed for a cropped region");
                        None
                    }
                },
            };
            plates.push(PlateResult::with_ocr(detection, ocr));
        }

        Ok(AlprOutput { plates, metrics })
    }

    /// Loads an image from disk and runs the pipeline on it.
    pub fn predict_path(&self, path: &Path) -> AlprResult<AlprOutput> {
        let image = crate::utils::load_image(path)?;
        self.predict(&image)
    }
}
