//! Plate detection example.
//!
//! Runs only the detection stage, printing every candidate plate box. Useful
//! for tuning the confidence threshold or benchmarking detector presets.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example plate_detection -- --model-path detector.onnx image.jpg
//! ```

use clap::Parser;
use oar_alpr::domain::PlateDetector;
use oar_alpr::predictor::PlateDetPredictorBuilder;
use oar_alpr::prelude::*;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the plate detection example
#[derive(Parser)]
#[command(name = "plate_detection")]
#[command(about = "Plate Detection Example - locates license plates in images")]
struct Args {
    /// Path to the detector model file; downloads the default preset when
    /// omitted
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// Paths to input images to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Square input resolution of the model
    #[arg(long, default_value = "384")]
    input_size: u32,

    /// Detection confidence threshold
    #[arg(long, default_value = "0.4")]
    conf_thresh: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let model_path = match args.model_path {
        Some(path) => {
            if !path.exists() {
                error!("Model file not found: {}", path.display());
                return Err("Model file not found".into());
            }
            path
        }
        None => DetectorModel::default().resolve()?,
    };

    let detector = PlateDetPredictorBuilder::new()
        .input_size(args.input_size)
        .conf_thresh(args.conf_thresh)
        .build(&model_path)?;

    for image_path in &args.images {
        let image = load_image(image_path)?;
        let detections = detector.detect(&image)?;
        info!(
            "{}: {} candidate plate(s)",
            image_path.display(),
            detections.len()
        );
        for (i, detection) in detections.iter().enumerate() {
            println!(
                "  Plate {}: {} (score: {:.3})",
                i + 1,
                detection.bounding_box,
                detection.confidence
            );
        }
    }

    Ok(())
}
