//! Letterbox resizing for the plate detector.
//!
//! The detector expects a square input; frames are resized preserving
//! aspect ratio and centered on a gray canvas. The transform parameters are
//! kept so detection boxes can be mapped back to the source image.

use crate::core::errors::AlprError;
use image::{Rgb, RgbImage, imageops};

/// Padding color used for the letterbox canvas.
const PAD_COLOR: Rgb<u8> = Rgb([114, 114, 114]);

/// Parameters of a letterbox transform, used to undo it on detection boxes.
#[derive(Debug, Clone, Copy)]
pub struct LetterboxTransform {
    /// Scale factor applied to the source image.
    pub scale: f32,
    /// Horizontal padding added on the left of the scaled image.
    pub pad_x: f32,
    /// Vertical padding added on the top of the scaled image.
    pub pad_y: f32,
    /// Source image width in pixels.
    pub src_width: u32,
    /// Source image height in pixels.
    pub src_height: u32,
}

impl LetterboxTransform {
    /// Maps a coordinate pair from letterbox space back onto the source
    /// image, clamped to its bounds.
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        let sx = ((x - self.pad_x) / self.scale).clamp(0.0, self.src_width as f32);
        let sy = ((y - self.pad_y) / self.scale).clamp(0.0, self.src_height as f32);
        (sx, sy)
    }
}

/// A processor that letterboxes images onto a square canvas.
#[derive(Debug, Clone, Copy)]
pub struct Letterbox {
    /// Side length of the square canvas.
    target_size: u32,
}

impl Letterbox {
    /// Creates a letterbox processor for the given square target size.
    pub fn new(target_size: u32) -> Result<Self, AlprError> {
        if target_size == 0 {
            return Err(AlprError::invalid_input(
                "letterbox target size must be greater than 0",
            ));
        }
        Ok(Self { target_size })
    }

    /// Returns the side length of the canvas.
    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Resizes `img` onto the padded canvas and returns the canvas together
    /// with the transform needed to undo the mapping.
    pub fn apply(&self, img: &RgbImage) -> Result<(RgbImage, LetterboxTransform), AlprError> {
        let (src_w, src_h) = img.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(AlprError::invalid_input(
                "cannot letterbox an empty image",
            ));
        }

        let size = self.target_size as f32;
        let scale = (size / src_w as f32).min(size / src_h as f32);
        let new_w = ((src_w as f32 * scale).round() as u32).clamp(1, self.target_size);
        let new_h = ((src_h as f32 * scale).round() as u32).clamp(1, self.target_size);

        let resized = imageops::resize(img, new_w, new_h, imageops::FilterType::Triangle);

        let pad_x = (self.target_size - new_w) / 2;
        let pad_y = (self.target_size - new_h) / 2;
        let mut canvas = RgbImage::from_pixel(self.target_size, self.target_size, PAD_COLOR);
        imageops::overlay(&mut canvas, &resized, pad_x as i64, pad_y as i64);

        let transform = LetterboxTransform {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            src_width: src_w,
            src_height: src_h,
        };

        Ok((canvas, transform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_square_input() {
        let letterbox = Letterbox::new(384).unwrap();
        let img = RgbImage::from_pixel(100, 100, Rgb([255, 0, 0]));
        let (canvas, transform) = letterbox.apply(&img).unwrap();
        assert_eq!(canvas.dimensions(), (384, 384));
        assert_eq!(transform.pad_x, 0.0);
        assert_eq!(transform.pad_y, 0.0);
        assert!((transform.scale - 3.84).abs() < 1e-5);
    }

    #[test]
    fn test_letterbox_wide_input_pads_vertically() {
        let letterbox = Letterbox::new(384).unwrap();
        let img = RgbImage::from_pixel(384, 192, Rgb([0, 255, 0]));
        let (canvas, transform) = letterbox.apply(&img).unwrap();
        assert_eq!(canvas.dimensions(), (384, 384));
        assert_eq!(transform.pad_x, 0.0);
        assert_eq!(transform.pad_y, 96.0);
        // Padded rows keep the canvas color.
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([114, 114, 114]));
        // Image rows carry the source color.
        assert_eq!(canvas.get_pixel(192, 192), &Rgb([0, 255, 0]));
    }

    #[test]
    fn test_letterbox_tall_input_pads_horizontally() {
        let letterbox = Letterbox::new(256).unwrap();
        let img = RgbImage::from_pixel(128, 256, Rgb([9, 9, 9]));
        let (canvas, transform) = letterbox.apply(&img).unwrap();
        assert_eq!(canvas.dimensions(), (256, 256));
        assert_eq!(transform.pad_x, 64.0);
        assert_eq!(transform.pad_y, 0.0);
        // A point on the left edge of the scaled image maps back to x = 0.
        let (sx, _) = transform.unmap(64.0, 10.0);
        assert_eq!(sx, 0.0);
    }

    #[test]
    fn test_unmap_round_trip() {
        let letterbox = Letterbox::new(384).unwrap();
        let img = RgbImage::from_pixel(768, 384, Rgb([0, 0, 255]));
        let (_, transform) = letterbox.apply(&img).unwrap();
        // A point in the middle of the letterboxed image maps back to the
        // middle of the source.
        let (sx, sy) = transform.unmap(192.0, 192.0);
        assert!((sx - 384.0).abs() < 1e-3);
        assert!((sy - 192.0).abs() < 1e-3);
    }

    #[test]
    fn test_unmap_clamps_to_source() {
        let letterbox = Letterbox::new(384).unwrap();
        let img = RgbImage::from_pixel(384, 192, Rgb([0, 0, 255]));
        let (_, transform) = letterbox.apply(&img).unwrap();
        // Coordinates inside the vertical padding clamp onto the source.
        let (_, sy) = transform.unmap(10.0, 0.0);
        assert_eq!(sy, 0.0);
        let (_, sy) = transform.unmap(10.0, 384.0);
        assert_eq!(sy, 192.0);
    }

    #[test]
    fn test_zero_target_size_rejected() {
        assert!(Letterbox::new(0).is_err());
    }
}
