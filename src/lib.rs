//! # OAR ALPR
//!
//! A Rust automatic license plate recognition (ALPR) library built on ONNX
//! models: a plate detector locates candidate regions in a frame and a
//! plate OCR model reads the characters inside each detected region.
//!
//! ## Features
//!
//! - Two-stage pipeline: detection, per-region crop, OCR
//! - Named model presets with cached downloads
//! - Pluggable detector/recognizer traits for custom models
//! - Execution provider selection (CPU, CUDA, OpenVINO, DirectML, QNN)
//! - ONNX Runtime integration for fast inference
//!
//! ## Modules
//!
//! * [`core`] - Error handling, configuration, and ONNX inference
//! * [`domain`] - Result types and the detector/recognizer traits
//! * [`hub`] - Model presets and cached downloads
//! * [`pipeline`] - The assembled two-stage pipeline
//! * [`predictor`] - ONNX-backed detector and recognizer
//! * [`processors`] - Image processing utilities
//! * [`utils`] - Image loading and visualization helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_alpr::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Default presets: yolo-v9-t-384 detector, European plates OCR.
//! let alpr = Alpr::builder()
//!     .detector_conf_thresh(0.4)
//!     .build()?;
//!
//! let output = alpr.predict_path(Path::new("frame.jpg"))?;
//! for plate in &output.plates {
//!     match plate.text_with_confidence() {
//!         Some((text, confidence)) => {
//!             println!("{} ({:.1}%)", text, confidence * 100.0)
//!         }
//!         None => println!("plate at {} not readable", plate.detection.bounding_box),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## JSON Configuration
//!
//! ```rust,no_run
//! use oar_alpr::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AlprConfig::from_json(r#"
//! {
//!   "detector": {
//!     "model": "yolo-v9-t-256-license-plate-end2end",
//!     "conf_thresh": 0.5,
//!     "ort_session": {
//!       "execution_providers": [{"CUDA": {"device_id": 0}}]
//!     }
//!   },
//!   "ocr": {
//!     "model": "global-plates-mobile-vit-v2-model"
//!   }
//! }
//! "#)?;
//!
//! let alpr = Alpr::from_config(config)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod hub;
pub mod pipeline;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use oar_alpr::prelude::*;
/// ```
///
/// Included items focus on the most common tasks:
/// - Pipeline (`Alpr`, `AlprBuilder`, `AlprConfig`)
/// - Results (`AlprOutput`, `PlateResult`, `PlateDetection`, `OcrOutcome`)
/// - Model presets (`DetectorModel`, `OcrModel`)
/// - Essential error and result types (`AlprError`, `AlprResult`)
/// - Basic image loading (`load_image`)
///
/// For advanced customization (custom adapters, session configuration),
/// import directly from the respective modules (e.g., `oar_alpr::domain`,
/// `oar_alpr::core`, `oar_alpr::predictor`).
pub mod prelude {
    pub use crate::pipeline::{Alpr, AlprBuilder, AlprConfig};

    pub use crate::domain::{AlprOutput, OcrOutcome, PlateDetection, PlateResult};

    pub use crate::hub::{DetectorModel, OcrModel};

    pub use crate::core::{AlprError, AlprResult};

    pub use crate::utils::{load_image, load_images_batch};
}
