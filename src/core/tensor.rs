//! Tensor type aliases used across the pipeline.

use ndarray::{Array2, Array3, Array4};

/// A 2D tensor of f32 values (rows, columns).
pub type Tensor2D = Array2<f32>;

/// A 3D tensor of f32 values (batch, rows, columns).
pub type Tensor3D = Array3<f32>;

/// A 4D tensor of f32 values (batch, channels, height, width).
pub type Tensor4D = Array4<f32>;
