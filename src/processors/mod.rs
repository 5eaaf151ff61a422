//! Image processing utilities for the ALPR pipeline.

pub mod crop;
pub mod geometry;
pub mod letterbox;
pub mod normalization;

pub use crop::crop_box;
pub use geometry::{BoundingBox, Point};
pub use letterbox::{Letterbox, LetterboxTransform};
pub use normalization::NormalizeImage;
