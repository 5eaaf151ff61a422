//! Domain types and adapter traits for the ALPR pipeline.
//!
//! This module defines the data that flows between the two stages
//! (detections, OCR outcomes, combined plate results) and the traits that
//! let callers substitute their own detector or recognizer for the
//! ONNX-backed defaults.

use crate::core::errors::AlprError;
use crate::processors::BoundingBox;
use image::RgbImage;
use std::fmt;
use std::sync::Arc;

/// One candidate plate region produced by the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateDetection {
    /// The bounding box of the detected plate, in original image coordinates.
    pub bounding_box: BoundingBox,
    /// Detector confidence for this region, in `[0, 1]`.
    pub confidence: f32,
}

impl PlateDetection {
    /// Creates a new detection.
    pub fn new(bounding_box: BoundingBox, confidence: f32) -> Self {
        Self {
            bounding_box,
            confidence,
        }
    }
}

/// The OCR reading for one cropped plate region.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutcome {
    /// The recognized plate text with padding characters removed.
    pub text: Arc<str>,
    /// Aggregate confidence: the mean probability over non-padding slots.
    pub confidence: f32,
    /// Per-slot character probabilities, including padding slots.
    pub char_confidences: Vec<f32>,
}

impl OcrOutcome {
    /// Creates a new OCR outcome.
    pub fn new(text: impl Into<Arc<str>>, confidence: f32, char_confidences: Vec<f32>) -> Self {
        Self {
            text: text.into(),
            confidence,
            char_confidences,
        }
    }
}

/// A detection paired with its OCR reading.
///
/// `ocr` is `None` when the crop failed, OCR produced no characters, or the
/// reading fell below the configured confidence threshold. The element still
/// appears in the pipeline output so callers see every detected region.
#[derive(Debug, Clone)]
pub struct PlateResult {
    /// The detected plate region.
    pub detection: PlateDetection,
    /// The OCR reading for the region's crop, if one was obtained.
    pub ocr: Option<OcrOutcome>,
}

impl PlateResult {
    /// Creates a result carrying only a detection.
    pub fn detection_only(detection: PlateDetection) -> Self {
        Self {
            detection,
            ocr: None,
        }
    }

    /// Creates a result with detection and OCR reading.
    pub fn with_ocr(detection: PlateDetection, ocr: Option<OcrOutcome>) -> Self {
        Self { detection, ocr }
    }

    /// Returns the recognized text, if any.
    pub fn text(&self) -> Option<&str> {
        self.ocr.as_ref().map(|o| o.text.as_ref())
    }

    /// Returns the OCR confidence, or `0.0` when no reading is attached.
    pub fn ocr_confidence(&self) -> f32 {
        self.ocr.as_ref().map(|o| o.confidence).unwrap_or(0.0)
    }

    /// Returns the text and its confidence as a tuple if a reading exists.
    pub fn text_with_confidence(&self) -> Option<(&str, f32)> {
        self.ocr.as_ref().map(|o| (o.text.as_ref(), o.confidence))
    }
}

/// Counters for per-crop degradations observed during one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMetrics {
    /// Number of detection boxes whose clamped crop had zero area.
    pub failed_crops: usize,
    /// Number of crops whose OCR reading was empty or below threshold.
    pub failed_recognitions: usize,
    /// Total number of plate regions detected.
    pub total_detections: usize,
}

impl ErrorMetrics {
    /// Creates a new ErrorMetrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any degradation was observed.
    pub fn has_quality_issues(&self) -> bool {
        self.failed_crops > 0 || self.failed_recognitions > 0
    }
}

/// Output of one pipeline run over a single image.
#[derive(Debug, Clone)]
pub struct AlprOutput {
    /// Combined results, one per detected region, in detector order.
    pub plates: Vec<PlateResult>,
    /// Degradation counters for this run.
    pub metrics: ErrorMetrics,
}

impl AlprOutput {
    /// Creates an empty output (no detections).
    pub fn empty() -> Self {
        Self {
            plates: Vec::new(),
            metrics: ErrorMetrics::new(),
        }
    }

    /// Returns the number of detected regions.
    pub fn len(&self) -> usize {
        self.plates.len()
    }

    /// Returns true when no plate regions were detected.
    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    /// Returns an iterator over results that carry a recognized text.
    pub fn recognized_plates(&self) -> impl Iterator<Item = &PlateResult> {
        self.plates.iter().filter(|p| p.ocr.is_some())
    }

    /// Returns all recognized plate texts in detector order.
    pub fn plate_texts(&self) -> Vec<&str> {
        self.plates.iter().filter_map(|p| p.text()).collect()
    }

    /// Returns the mean OCR confidence over recognized plates.
    pub fn average_confidence(&self) -> Option<f32> {
        let recognized: Vec<f32> = self
            .plates
            .iter()
            .filter_map(|p| p.ocr.as_ref().map(|o| o.confidence))
            .collect();
        if recognized.is_empty() {
            None
        } else {
            Some(recognized.iter().sum::<f32>() / recognized.len() as f32)
        }
    }
}

impl fmt::Display for AlprOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detected plates: {}", self.plates.len())?;
        for (i, plate) in self.plates.iter().enumerate() {
            write!(
                f,
                "  Plate {}: {} (detection: {:.3})",
                i + 1,
                plate.detection.bounding_box,
                plate.detection.confidence
            )?;
            match plate.text_with_confidence() {
                Some((text, confidence)) => {
                    writeln!(f, " -> '{text}' (ocr: {confidence:.3})")?;
                }
                None => writeln!(f, " -> [no text recognized]")?,
            }
        }
        if self.metrics.has_quality_issues() {
            writeln!(
                f,
                "Degraded: {} failed crops, {} failed recognitions of {} detections",
                self.metrics.failed_crops,
                self.metrics.failed_recognitions,
                self.metrics.total_detections
            )?;
        }
        Ok(())
    }
}

/// Trait for plate detectors.
///
/// Implemented by the ONNX-backed [`crate::predictor::PlateDetPredictor`];
/// callers can plug in their own detector through
/// [`crate::pipeline::AlprBuilder::detector`].
pub trait PlateDetector: Send + Sync + std::fmt::Debug {
    /// Detects candidate plate regions in a frame.
    ///
    /// Returns the detections in the detector's own ranking order; an image
    /// without plates yields an empty vector, not an error.
    fn detect(&self, image: &RgbImage) -> Result<Vec<PlateDetection>, AlprError>;
}

/// Trait for plate OCR models.
///
/// Implemented by the ONNX-backed [`crate::predictor::PlateRecPredictor`];
/// callers can plug in their own recognizer through
/// [`crate::pipeline::AlprBuilder::recognizer`].
pub trait PlateRecognizer: Send + Sync + std::fmt::Debug {
    /// Reads the characters from one cropped plate region.
    fn recognize(&self, plate: &RgbImage) -> Result<OcrOutcome, AlprError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(confidence: f32) -> PlateDetection {
        PlateDetection::new(BoundingBox::from_coords(0.0, 0.0, 10.0, 10.0), confidence)
    }

    #[test]
    fn test_plate_result_without_ocr() {
        let result = PlateResult::detection_only(detection(0.9));
        assert_eq!(result.text(), None);
        assert_eq!(result.ocr_confidence(), 0.0);
    }

    #[test]
    fn test_output_helpers() {
        let output = AlprOutput {
            plates: vec![
                PlateResult::with_ocr(
                    detection(0.9),
                    Some(OcrOutcome::new("AB123CD", 0.8, vec![0.8; 7])),
                ),
                PlateResult::detection_only(detection(0.5)),
            ],
            metrics: ErrorMetrics {
                failed_crops: 0,
                failed_recognitions: 1,
                total_detections: 2,
            },
        };
        assert_eq!(output.len(), 2);
        assert_eq!(output.plate_texts(), vec!["AB123CD"]);
        assert_eq!(output.recognized_plates().count(), 1);
        assert_eq!(output.average_confidence(), Some(0.8));
        assert!(output.metrics.has_quality_issues());
    }

    #[test]
    fn test_empty_output() {
        let output = AlprOutput::empty();
        assert!(output.is_empty());
        assert_eq!(output.average_confidence(), None);
    }

    #[test]
    fn test_display_marks_unrecognized_plates() {
        let output = AlprOutput {
            plates: vec![PlateResult::detection_only(detection(0.7))],
            metrics: ErrorMetrics::new(),
        };
        let text = output.to_string();
        assert!(text.contains("[no text recognized]"));
    }
}
