//! Image-to-tensor normalization for model inputs.
//!
//! Both plate models take inputs scaled to `[0, 1]`: the detector a 3-channel
//! RGB tensor, the recognizer a single-channel grayscale tensor. Tensors are
//! laid out NCHW.

use crate::core::errors::AlprError;
use crate::core::tensor::Tensor4D;
use image::{GrayImage, RgbImage};
use ndarray::Array4;

/// Scale factor mapping u8 pixel values into `[0, 1]`.
const PIXEL_SCALE: f32 = 1.0 / 255.0;

/// Converts images into normalized NCHW f32 tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeImage;

impl NormalizeImage {
    /// Creates a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Converts one RGB image into a `(1, 3, H, W)` tensor scaled to `[0, 1]`.
    pub fn rgb_to_tensor(&self, img: &RgbImage) -> Result<Tensor4D, AlprError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(AlprError::invalid_input("cannot normalize an empty image"));
        }
        let (w, h) = (width as usize, height as usize);

        let mut tensor = Array4::zeros((1, 3, h, w));
        for (x, y, pixel) in img.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            tensor[[0, 0, y, x]] = pixel[0] as f32 * PIXEL_SCALE;
            tensor[[0, 1, y, x]] = pixel[1] as f32 * PIXEL_SCALE;
            tensor[[0, 2, y, x]] = pixel[2] as f32 * PIXEL_SCALE;
        }
        Ok(tensor)
    }

    /// Converts one grayscale image into a `(1, 1, H, W)` tensor scaled to
    /// `[0, 1]`.
    pub fn gray_to_tensor(&self, img: &GrayImage) -> Result<Tensor4D, AlprError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(AlprError::invalid_input("cannot normalize an empty image"));
        }
        let (w, h) = (width as usize, height as usize);

        let mut tensor = Array4::zeros((1, 1, h, w));
        for (x, y, pixel) in img.enumerate_pixels() {
            tensor[[0, 0, y as usize, x as usize]] = pixel[0] as f32 * PIXEL_SCALE;
        }
        Ok(tensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn test_rgb_tensor_shape_and_scale() {
        let img = RgbImage::from_pixel(4, 2, Rgb([255, 0, 51]));
        let tensor = NormalizeImage::new().rgb_to_tensor(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 2, 4]);
        assert_eq!(tensor[[0, 0, 0, 0]], 1.0);
        assert_eq!(tensor[[0, 1, 0, 0]], 0.0);
        assert!((tensor[[0, 2, 1, 3]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_gray_tensor_shape_and_scale() {
        let img = GrayImage::from_pixel(3, 5, Luma([128]));
        let tensor = NormalizeImage::new().gray_to_tensor(&img).unwrap();
        assert_eq!(tensor.shape(), &[1, 1, 5, 3]);
        assert!((tensor[[0, 0, 2, 1]] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = RgbImage::new(0, 0);
        assert!(NormalizeImage::new().rgb_to_tensor(&img).is_err());
    }
}
