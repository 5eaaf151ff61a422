//! Full ALPR pipeline example.
//!
//! Runs plate detection and OCR over one or more images and optionally
//! saves visualizations with the recognized plates drawn in.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example alpr -- image1.jpg image2.jpg --output-dir ./out
//! ```

use clap::Parser;
use oar_alpr::core::{OrtExecutionProvider, OrtSessionConfig};
use oar_alpr::prelude::*;
use oar_alpr::utils::{VisualizationConfig, draw_predictions};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the ALPR example
#[derive(Parser)]
#[command(name = "alpr")]
#[command(about = "ALPR Example - detects and reads license plates in images")]
struct Args {
    /// Paths to input images to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Detector model preset
    #[arg(long, default_value = "yolo-v9-t-384-license-plate-end2end")]
    detector_model: DetectorModel,

    /// OCR model preset
    #[arg(long, default_value = "european-plates-mobile-vit-v2-model")]
    ocr_model: OcrModel,

    /// Device to use for inference ('cpu' or 'cuda')
    #[arg(short, long, default_value = "cpu")]
    device: String,

    /// Detection confidence threshold
    #[arg(long, default_value = "0.4")]
    conf_thresh: f32,

    /// Directory to save visualization results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let existing_images: Vec<PathBuf> = args
        .images
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                error!("Image file not found: {}", path.display());
            }
            exists
        })
        .cloned()
        .collect();

    if existing_images.is_empty() {
        error!("No valid image files found");
        return Err("No valid image files found".into());
    }

    let mut builder = Alpr::builder()
        .detector_model(args.detector_model)
        .ocr_model(args.ocr_model)
        .detector_conf_thresh(args.conf_thresh);

    info!("Using device: {}", args.device);
    if args.device == "cuda" {
        let session = OrtSessionConfig::new().with_execution_providers(vec![
            OrtExecutionProvider::CUDA { device_id: Some(0) },
            OrtExecutionProvider::CPU,
        ]);
        builder = builder
            .detector_ort_session(session.clone())
            .ocr_ort_session(session);
    }

    let alpr = builder.build()?;
    info!("Pipeline ready");

    let vis_config = if args.output_dir.is_some() {
        VisualizationConfig::with_system_font()
    } else {
        VisualizationConfig::default()
    };

    for image_path in &existing_images {
        let image = load_image(image_path)?;
        let start = Instant::now();
        let output = alpr.predict(&image)?;
        info!(
            "{}: {} plate(s) in {:.1?}",
            image_path.display(),
            output.len(),
            start.elapsed()
        );
        print!("{output}");

        if let Some(output_dir) = &args.output_dir {
            std::fs::create_dir_all(output_dir)?;
            let vis = draw_predictions(&image, &output.plates, &vis_config);
            let file_name = image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("result");
            let target = output_dir.join(format!("{file_name}_alpr.png"));
            vis.save(&target)?;
            info!("Saved visualization to {}", target.display());
        }
    }

    Ok(())
}
