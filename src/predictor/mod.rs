//! ONNX-backed predictors for the two pipeline stages.

pub mod plate_detector;
pub mod plate_recognizer;

pub use plate_detector::{PlateDetPredictor, PlateDetPredictorBuilder, PlateDetPredictorConfig};
pub use plate_recognizer::{
    PlateRecPredictor, PlateRecPredictorBuilder, PlateRecPredictorConfig,
};
