//! Visualization utilities for pipeline results.
//!
//! Draws detection boxes and recognized plate text onto a frame: a hollow
//! box per detection and, when a font is available, a "TEXT conf%" label
//! with a filled backdrop above the box.

use crate::domain::PlateResult;
use crate::processors::BoundingBox;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::{debug, info};

const BBOX_COLOR: Rgb<u8> = Rgb([36, 255, 12]);

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

const LABEL_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Configuration for result visualization.
pub struct VisualizationConfig {
    /// The font to use for text rendering. If None, labels are skipped.
    pub font: Option<FontVec>,

    /// The scale factor for the font. Defaults to 18.0.
    pub font_scale: f32,

    /// The thickness of bounding box lines. Defaults to 2.
    pub bbox_thickness: u32,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_scale: 18.0,
            bbox_thickness: 2,
        }
    }
}

impl VisualizationConfig {
    /// Creates a VisualizationConfig with a font loaded from the given path.
    pub fn with_font_path(font_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let font_data = std::fs::read(font_path)?;
        let font = FontVec::try_from_vec(font_data)
            .map_err(|_| format!("failed to parse font file: {}", font_path.display()))?;

        Ok(Self {
            font: Some(font),
            ..Self::default()
        })
    }

    /// Creates a VisualizationConfig with a system font.
    ///
    /// Tries common font locations and falls back to the default (no label
    /// rendering) when none is found.
    pub fn with_system_font() -> Self {
        let font_paths = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "C:\\Windows\\Fonts\\arial.ttf",
        ];

        for path in &font_paths {
            if let Ok(font_data) = std::fs::read(path)
                && let Ok(font) = FontVec::try_from_vec(font_data)
            {
                info!("loaded system font: {}", path);
                return Self {
                    font: Some(font),
                    ..Self::default()
                };
            }
        }

        debug!("no system font found, plate labels will be skipped");
        Self::default()
    }
}

/// Draws detection boxes and recognized text onto a copy of `frame`.
pub fn draw_predictions(
    frame: &RgbImage,
    plates: &[PlateResult],
    config: &VisualizationConfig,
) -> RgbImage {
    let mut canvas = frame.clone();

    for plate in plates {
        draw_bounding_box(&mut canvas, &plate.detection.bounding_box, config.bbox_thickness);

        if let Some(font) = &config.font
            && let Some((text, confidence)) = plate.text_with_confidence()
        {
            let label = format!("{text} {:.1}%", confidence * 100.0);
            draw_label(&mut canvas, &plate.detection.bounding_box, &label, font, config);
        }
    }

    canvas
}

fn draw_bounding_box(canvas: &mut RgbImage, bbox: &BoundingBox, thickness: u32) {
    let Some((x, y, w, h)) = bbox.clamp_to(canvas.width(), canvas.height()).to_pixel_region()
    else {
        return;
    };

    for offset in 0..thickness {
        let grown_w = w + 2 * offset;
        let grown_h = h + 2 * offset;
        let rect = Rect::at(x as i32 - offset as i32, y as i32 - offset as i32)
            .of_size(grown_w.max(1), grown_h.max(1));
        draw_hollow_rect_mut(canvas, rect, BBOX_COLOR);
    }
}

fn draw_label(
    canvas: &mut RgbImage,
    bbox: &BoundingBox,
    label: &str,
    font: &FontVec,
    config: &VisualizationConfig,
) {
    let scale = PxScale::from(config.font_scale);
    let label_height = config.font_scale.ceil() as u32 + 4;
    // Rough monospace-style estimate; wide enough for plate strings.
    let label_width = (label.len() as f32 * config.font_scale * 0.6).ceil() as u32 + 4;

    let x = bbox.x1.max(0.0) as i32;
    let y = (bbox.y1 as i32 - label_height as i32).max(0);

    let backdrop = Rect::at(x, y).of_size(label_width.max(1), label_height);
    draw_filled_rect_mut(canvas, backdrop, LABEL_BACKGROUND);
    draw_text_mut(canvas, TEXT_COLOR, x + 2, y + 2, scale, font, label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OcrOutcome, PlateDetection};

    fn sample_plates() -> Vec<PlateResult> {
        vec![PlateResult::with_ocr(
            PlateDetection::new(BoundingBox::from_coords(20.0, 30.0, 80.0, 50.0), 0.9),
            Some(OcrOutcome::new("AB123CD", 0.85, vec![0.85; 7])),
        )]
    }

    #[test]
    fn test_draw_predictions_marks_box_edges() {
        let frame = RgbImage::from_pixel(120, 90, Rgb([0, 0, 0]));
        let canvas = draw_predictions(&frame, &sample_plates(), &VisualizationConfig::default());
        assert_eq!(canvas.dimensions(), frame.dimensions());
        // A pixel on the box outline takes the box color.
        assert_eq!(canvas.get_pixel(20, 30), &BBOX_COLOR);
        // A pixel far away stays untouched.
        assert_eq!(canvas.get_pixel(110, 85), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_predictions_without_detections_is_identity() {
        let frame = RgbImage::from_pixel(64, 64, Rgb([7, 7, 7]));
        let canvas = draw_predictions(&frame, &[], &VisualizationConfig::default());
        assert_eq!(canvas, frame);
    }

    #[test]
    fn test_out_of_frame_box_is_skipped() {
        let frame = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        let plates = vec![PlateResult::detection_only(PlateDetection::new(
            BoundingBox::from_coords(100.0, 100.0, 140.0, 120.0),
            0.5,
        ))];
        let canvas = draw_predictions(&frame, &plates, &VisualizationConfig::default());
        assert_eq!(canvas, frame);
    }
}
