//! Utility functions for image loading and conversion.

use crate::core::AlprError;
use image::{DynamicImage, GrayImage, ImageBuffer, RgbImage};

/// Number of images above which batch loading goes parallel.
const DEFAULT_PARALLEL_THRESHOLD: usize = 8;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Converts a DynamicImage to a GrayImage.
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `AlprError::ImageLoad` if the image cannot be decoded.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage, AlprError> {
    let img = image::open(path).map_err(AlprError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Creates an RgbImage from raw RGB pixel data.
///
/// Returns `None` if the data length does not match the dimensions.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    if data.len() != (width * height * 3) as usize {
        return None;
    }

    ImageBuffer::from_raw(width, height, data)
}

/// Loads a batch of images from file paths.
///
/// Uses parallel loading when the number of paths exceeds the default
/// threshold.
pub fn load_images_batch<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
) -> Result<Vec<RgbImage>, AlprError> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of images from file paths with a custom parallel threshold.
pub fn load_images_batch_with_threshold<P: AsRef<std::path::Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, AlprError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths.par_iter().map(|p| load_image(p.as_ref())).collect()
    } else {
        paths.iter().map(|p| load_image(p.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rgb_image_valid_data() {
        let data = vec![0u8; 4 * 3 * 3];
        let img = create_rgb_image(4, 3, data).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
    }

    #[test]
    fn test_create_rgb_image_wrong_length() {
        assert!(create_rgb_image(4, 3, vec![0u8; 10]).is_none());
    }

    #[test]
    fn test_load_image_missing_file() {
        let err = load_image(std::path::Path::new("/nonexistent/frame.jpg")).unwrap_err();
        assert!(matches!(err, AlprError::ImageLoad(_)));
    }

    #[test]
    fn test_load_images_batch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..3 {
            let path = dir.path().join(format!("frame_{i}.png"));
            RgbImage::from_pixel(8, 8, image::Rgb([i as u8, 0, 0]))
                .save(&path)
                .unwrap();
            paths.push(path);
        }
        let images = load_images_batch(&paths).unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(images[2].get_pixel(0, 0), &image::Rgb([2, 0, 0]));
    }
}
