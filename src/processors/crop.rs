//! Plate-region cropping.
//!
//! The orchestrator hands each detection box to the OCR stage as a pixel
//! crop. Boxes are clamped to the image bounds first so detections touching
//! a frame edge crop cleanly instead of erroring.

use crate::core::errors::AlprError;
use crate::processors::geometry::BoundingBox;
use image::{RgbImage, imageops};

/// Extracts exactly the pixel region covered by `bbox` from `img`.
///
/// The box is clamped to the image bounds, the top-left corner floored and
/// the bottom-right corner ceiled. Returns `Ok(None)` when the clamped
/// region has zero area (a detection fully outside the frame or collapsed
/// onto an edge), which the pipeline records as a failed crop rather than
/// an error.
pub fn crop_box(img: &RgbImage, bbox: &BoundingBox) -> Result<Option<RgbImage>, AlprError> {
    let (img_w, img_h) = img.dimensions();
    if img_w == 0 || img_h == 0 {
        return Err(AlprError::invalid_input("cannot crop an empty image"));
    }

    let clamped = bbox.clamp_to(img_w, img_h);
    let Some((x, y, w, h)) = clamped.to_pixel_region() else {
        return Ok(None);
    };

    // to_pixel_region ceils the far corner, which can overshoot the image
    // by a fraction of a pixel; trim back to the frame.
    let w = w.min(img_w - x);
    let h = h.min(img_h - y);
    if w == 0 || h == 0 {
        return Ok(None);
    }

    Ok(Some(imageops::crop_imm(img, x, y, w, h).to_image()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_crop_interior_box_is_exact() {
        let img = gradient_image(100, 80);
        let bbox = BoundingBox::from_coords(10.0, 20.0, 30.0, 50.0);
        let crop = crop_box(&img, &bbox).unwrap().unwrap();
        assert_eq!(crop.dimensions(), (20, 30));
        // The first cropped pixel is the source pixel at (10, 20).
        assert_eq!(crop.get_pixel(0, 0), img.get_pixel(10, 20));
        // The last cropped pixel is the source pixel at (29, 49).
        assert_eq!(crop.get_pixel(19, 29), img.get_pixel(29, 49));
    }

    #[test]
    fn test_crop_fractional_box_rounds_outward() {
        let img = gradient_image(100, 80);
        let bbox = BoundingBox::from_coords(10.6, 20.4, 29.2, 49.8);
        let crop = crop_box(&img, &bbox).unwrap().unwrap();
        // floor(10.6)=10, ceil(29.2)=30 -> width 20; floor(20.4)=20,
        // ceil(49.8)=50 -> height 30.
        assert_eq!(crop.dimensions(), (20, 30));
        assert_eq!(crop.get_pixel(0, 0), img.get_pixel(10, 20));
    }

    #[test]
    fn test_crop_clamps_at_image_edge() {
        let img = gradient_image(100, 80);
        let bbox = BoundingBox::from_coords(90.0, 70.0, 120.0, 95.0);
        let crop = crop_box(&img, &bbox).unwrap().unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
        assert_eq!(crop.get_pixel(0, 0), img.get_pixel(90, 70));
        assert_eq!(crop.get_pixel(9, 9), img.get_pixel(99, 79));
    }

    #[test]
    fn test_crop_box_fully_outside_is_none() {
        let img = gradient_image(100, 80);
        let bbox = BoundingBox::from_coords(150.0, 10.0, 180.0, 40.0);
        assert!(crop_box(&img, &bbox).unwrap().is_none());
    }

    #[test]
    fn test_crop_full_image_box() {
        let img = gradient_image(100, 80);
        let bbox = BoundingBox::from_coords(0.0, 0.0, 100.0, 80.0);
        let crop = crop_box(&img, &bbox).unwrap().unwrap();
        assert_eq!(crop.dimensions(), (100, 80));
    }
}
