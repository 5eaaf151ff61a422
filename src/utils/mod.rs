//! Utility functions for images and visualization.

pub mod image;
pub mod visualization;

pub use image::{
    create_rgb_image, dynamic_to_gray, dynamic_to_rgb, load_image, load_images_batch,
    load_images_batch_with_threshold,
};
pub use visualization::{VisualizationConfig, draw_predictions};
