//! Model presets and cached downloads.
//!
//! Both pipeline stages ship with named model presets. A preset knows its
//! download URL plus the metadata the adapters need (input resolution for
//! the detector; alphabet, slot count, and input shape for the OCR model).
//! `resolve` returns a cached local path, downloading the model on first
//! use. Explicit model paths bypass this module entirely.

use crate::core::errors::AlprError;
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

const DETECTOR_RELEASE_BASE: &str =
    "https://github.com/ankandrew/open-image-models/releases/download/v1.0";
const OCR_RELEASE_BASE: &str =
    "https://github.com/ankandrew/fast-plate-ocr/releases/download/arg-plates";

/// Alphabet shared by the mobile ViT plate OCR models. The trailing
/// underscore is the padding symbol for unused slots.
const VIT_PLATE_ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_";

/// Named plate detection model presets.
///
/// All presets are single-class YOLO v9 exports with NMS fused into the
/// graph (end-to-end), differing in backbone size and input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DetectorModel {
    /// YOLO v9 small backbone, 608x608 input.
    #[serde(rename = "yolo-v9-s-608-license-plate-end2end")]
    YoloV9S608,
    /// YOLO v9 tiny backbone, 640x640 input.
    #[serde(rename = "yolo-v9-t-640-license-plate-end2end")]
    YoloV9T640,
    /// YOLO v9 tiny backbone, 512x512 input.
    #[serde(rename = "yolo-v9-t-512-license-plate-end2end")]
    YoloV9T512,
    /// YOLO v9 tiny backbone, 416x416 input.
    #[serde(rename = "yolo-v9-t-416-license-plate-end2end")]
    YoloV9T416,
    /// YOLO v9 tiny backbone, 384x384 input.
    #[serde(rename = "yolo-v9-t-384-license-plate-end2end")]
    YoloV9T384,
    /// YOLO v9 tiny backbone, 256x256 input.
    #[serde(rename = "yolo-v9-t-256-license-plate-end2end")]
    YoloV9T256,
}

impl Default for DetectorModel {
    fn default() -> Self {
        Self::YoloV9T384
    }
}

impl DetectorModel {
    /// Returns the preset's hub name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YoloV9S608 => "yolo-v9-s-608-license-plate-end2end",
            Self::YoloV9T640 => "yolo-v9-t-640-license-plate-end2end",
            Self::YoloV9T512 => "yolo-v9-t-512-license-plate-end2end",
            Self::YoloV9T416 => "yolo-v9-t-416-license-plate-end2end",
            Self::YoloV9T384 => "yolo-v9-t-384-license-plate-end2end",
            Self::YoloV9T256 => "yolo-v9-t-256-license-plate-end2end",
        }
    }

    /// Returns the square input resolution of the model.
    pub fn input_size(&self) -> u32 {
        match self {
            Self::YoloV9S608 => 608,
            Self::YoloV9T640 => 640,
            Self::YoloV9T512 => 512,
            Self::YoloV9T416 => 416,
            Self::YoloV9T384 => 384,
            Self::YoloV9T256 => 256,
        }
    }

    /// Returns the download URL for this preset.
    pub fn url(&self) -> String {
        format!("{DETECTOR_RELEASE_BASE}/{}.onnx", self.as_str())
    }

    /// Resolves the preset to a local model file, downloading it into the
    /// cache directory on first use.
    pub fn resolve(&self) -> Result<PathBuf, AlprError> {
        let cache = ModelCache::open()?;
        cache.fetch(&self.url(), &format!("{}.onnx", self.as_str()))
    }
}

impl FromStr for DetectorModel {
    type Err = AlprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yolo-v9-s-608-license-plate-end2end" => Ok(Self::YoloV9S608),
            "yolo-v9-t-640-license-plate-end2end" => Ok(Self::YoloV9T640),
            "yolo-v9-t-512-license-plate-end2end" => Ok(Self::YoloV9T512),
            "yolo-v9-t-416-license-plate-end2end" => Ok(Self::YoloV9T416),
            "yolo-v9-t-384-license-plate-end2end" => Ok(Self::YoloV9T384),
            "yolo-v9-t-256-license-plate-end2end" => Ok(Self::YoloV9T256),
            other => Err(AlprError::config_error(format!(
                "unknown detector model preset '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for DetectorModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named plate OCR model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OcrModel {
    /// Mobile ViT v2 trained on European plates.
    #[serde(rename = "european-plates-mobile-vit-v2-model")]
    EuropeanPlatesMobileVitV2,
    /// Mobile ViT v2 trained on a worldwide plate corpus.
    #[serde(rename = "global-plates-mobile-vit-v2-model")]
    GlobalPlatesMobileVitV2,
    /// CNN trained on Argentinian plates.
    #[serde(rename = "argentinian-plates-cnn-model")]
    ArgentinianPlatesCnn,
}

impl Default for OcrModel {
    fn default() -> Self {
        Self::EuropeanPlatesMobileVitV2
    }
}

impl OcrModel {
    /// Returns the preset's hub name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EuropeanPlatesMobileVitV2 => "european-plates-mobile-vit-v2-model",
            Self::GlobalPlatesMobileVitV2 => "global-plates-mobile-vit-v2-model",
            Self::ArgentinianPlatesCnn => "argentinian-plates-cnn-model",
        }
    }

    /// Returns the model's alphabet; the last character is the padding
    /// symbol.
    pub fn alphabet(&self) -> &'static str {
        VIT_PLATE_ALPHABET
    }

    /// Returns the padding character marking unused slots.
    pub fn padding_char(&self) -> char {
        '_'
    }

    /// Returns the number of character slots the model emits.
    pub fn slots(&self) -> usize {
        match self {
            Self::EuropeanPlatesMobileVitV2 => 7,
            Self::GlobalPlatesMobileVitV2 => 9,
            Self::ArgentinianPlatesCnn => 7,
        }
    }

    /// Returns the model's grayscale input shape as `(height, width)`.
    pub fn input_shape(&self) -> (u32, u32) {
        (70, 140)
    }

    /// Returns the download URL for this preset.
    pub fn url(&self) -> String {
        format!("{OCR_RELEASE_BASE}/{}.onnx", self.as_str())
    }

    /// Resolves the preset to a local model file, downloading it into the
    /// cache directory on first use.
    pub fn resolve(&self) -> Result<PathBuf, AlprError> {
        let cache = ModelCache::open()?;
        cache.fetch(&self.url(), &format!("{}.onnx", self.as_str()))
    }
}

impl FromStr for OcrModel {
    type Err = AlprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "european-plates-mobile-vit-v2-model" => Ok(Self::EuropeanPlatesMobileVitV2),
            "global-plates-mobile-vit-v2-model" => Ok(Self::GlobalPlatesMobileVitV2),
            "argentinian-plates-cnn-model" => Ok(Self::ArgentinianPlatesCnn),
            other => Err(AlprError::config_error(format!(
                "unknown OCR model preset '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for OcrModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk cache for downloaded models.
#[derive(Debug)]
pub struct ModelCache {
    root: PathBuf,
}

impl ModelCache {
    /// Opens the user cache directory for this crate, creating it if needed.
    pub fn open() -> Result<Self, AlprError> {
        let dirs = ProjectDirs::from("", "", "oar-alpr").ok_or_else(|| {
            AlprError::hub_error(
                "unable to determine cache directory for models",
                None::<std::io::Error>,
            )
        })?;
        let root = dirs.cache_dir().join("models");
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Opens a cache rooted at an explicit directory (used in tests).
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self, AlprError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the path a file with the given name is cached at.
    pub fn cached_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Returns the cached path for `file_name`, downloading from `url` when
    /// it is not present yet.
    pub fn fetch(&self, url: &str, file_name: &str) -> Result<PathBuf, AlprError> {
        let target = self.cached_path(file_name);
        if target.is_file() {
            debug!(model = file_name, "using cached model");
            return Ok(target);
        }

        info!(model = file_name, url, "downloading model");
        let mut response = reqwest::blocking::get(url)
            .map_err(|e| AlprError::hub_error(format!("failed to download {url}"), Some(e)))?;
        if !response.status().is_success() {
            return Err(AlprError::hub_error(
                format!("failed to download {url} (status {})", response.status()),
                None::<std::io::Error>,
            ));
        }

        // Download into a partial file and rename so an interrupted
        // download never leaves a truncated model in the cache.
        let partial = target.with_extension("onnx.part");
        let mut file = fs::File::create(&partial)?;
        response
            .copy_to(&mut file)
            .map_err(|e| AlprError::hub_error(format!("failed to download {url}"), Some(e)))?;
        file.flush()?;
        drop(file);
        fs::rename(&partial, &target)?;

        info!(model = file_name, path = %target.display(), "model cached");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_preset_round_trip() {
        for preset in [
            DetectorModel::YoloV9S608,
            DetectorModel::YoloV9T640,
            DetectorModel::YoloV9T512,
            DetectorModel::YoloV9T416,
            DetectorModel::YoloV9T384,
            DetectorModel::YoloV9T256,
        ] {
            assert_eq!(preset.as_str().parse::<DetectorModel>().unwrap(), preset);
        }
    }

    #[test]
    fn test_detector_input_size_matches_name() {
        assert_eq!(DetectorModel::YoloV9T384.input_size(), 384);
        assert_eq!(DetectorModel::YoloV9S608.input_size(), 608);
    }

    #[test]
    fn test_unknown_preset_is_config_error() {
        let err = "yolo-v11-license-plate".parse::<DetectorModel>().unwrap_err();
        assert!(matches!(err, AlprError::ConfigError { .. }));
    }

    #[test]
    fn test_ocr_preset_metadata() {
        let model = OcrModel::EuropeanPlatesMobileVitV2;
        assert_eq!(model.slots(), 7);
        assert_eq!(model.input_shape(), (70, 140));
        assert!(model.alphabet().ends_with(model.padding_char()));
        assert_eq!(OcrModel::GlobalPlatesMobileVitV2.slots(), 9);
    }

    #[test]
    fn test_ocr_preset_round_trip() {
        for preset in [
            OcrModel::EuropeanPlatesMobileVitV2,
            OcrModel::GlobalPlatesMobileVitV2,
            OcrModel::ArgentinianPlatesCnn,
        ] {
            assert_eq!(preset.as_str().parse::<OcrModel>().unwrap(), preset);
        }
    }

    #[test]
    fn test_cache_hit_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ModelCache::with_root(dir.path()).unwrap();
        let cached = cache.cached_path("dummy.onnx");
        std::fs::write(&cached, b"weights").unwrap();
        // The URL is never contacted for a cache hit.
        let resolved = cache.fetch("http://invalid.invalid/dummy.onnx", "dummy.onnx");
        assert_eq!(resolved.unwrap(), cached);
    }
}
