// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR (Optical Character Recognition) for Scanwerk.
//
// Extracts text from page images using the `ocrs` crate, a pure-Rust OCR
// engine backed by neural network models executed via `rten`. The engine is
// plugged into the fetch pipeline through `OcrFetcherFactory`, which turns a
// selected image into a `TextFetcher` for one recognition run.
//
// # Feature Gate
//
// This module is only available when the `ocr` feature is enabled:
//
// ```toml
// scanwerk-document = { path = "crates/scanwerk-document", features = ["ocr"] }
// ```
//
// # Model Setup
//
// The engine needs two model files in one directory:
//
// - **Detection model** (`text-detection.rten`): locates text regions.
// - **Recognition model** (`text-recognition.rten`): decodes characters.
//
// Running `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs`
// (typically `~/.cache/ocrs`), which is the default location.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
use rten::Model;
use scanwerk_core::error::{FetchError, ScannerError};
use tracing::{debug, info, instrument};

use crate::image::ImageProcessor;
use crate::scan::fetch::TextFetcher;
use crate::scan::workflow::FetcherFactory;

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Where to load the OCR models from.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Use `dir` if given, otherwise the model cache directory.
    pub fn from_optional_dir(dir: Option<&Path>) -> Self {
        dir.map(Self::from_dir).unwrap_or_default()
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<(), ScannerError> {
        for (kind, path) in [
            ("detection", &self.detection_model_path),
            ("recognition", &self.recognition_model_path),
        ] {
            if !path.exists() {
                return Err(ScannerError::OcrError(format!(
                    "{kind} model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Loaded OCR engine. Model loading is the expensive step, so build one and
/// share it (it is `Send + Sync`) across recognition runs.
pub struct OcrEngine {
    engine: OcrsEngine,
}

impl OcrEngine {
    /// Load the detection and recognition models named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScannerError::OcrError`] if model files are missing or corrupt.
    #[instrument(skip_all, fields(
        detection = %config.detection_model_path.display(),
        recognition = %config.recognition_model_path.display(),
    ))]
    pub fn new(config: OcrConfig) -> Result<Self, ScannerError> {
        config.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&config.detection_model_path).map_err(|err| {
            ScannerError::OcrError(format!(
                "failed to load detection model from {}: {}",
                config.detection_model_path.display(),
                err
            ))
        })?;

        info!("Loading OCR recognition model");
        let recognition_model =
            Model::load_file(&config.recognition_model_path).map_err(|err| {
                ScannerError::OcrError(format!(
                    "failed to load recognition model from {}: {}",
                    config.recognition_model_path.display(),
                    err
                ))
            })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| ScannerError::OcrError(format!("failed to initialise OCR engine: {}", err)))?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Extract all text from an image, lines separated by newlines.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn recognize_text(&self, image: &DynamicImage) -> Result<String, FetchError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
            FetchError::new(format!(
                "failed to create image source ({}x{}): {}",
                width, height, err
            ))
        })?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| FetchError::new(format!("OCR preprocessing failed: {}", err)))?;

        let text = self
            .engine
            .get_text(&input)
            .map_err(|err| FetchError::new(format!("OCR text recognition failed: {}", err)))?;

        debug!(
            line_count = text.lines().count(),
            char_count = text.len(),
            "OCR recognition complete"
        );
        Ok(text)
    }
}

/// One recognition run over one image.
struct OcrFetcher {
    engine: Arc<OcrEngine>,
    image: DynamicImage,
}

impl TextFetcher for OcrFetcher {
    fn fetch(&self) -> Result<String, FetchError> {
        self.engine.recognize_text(&self.image)
    }
}

/// Hands out OCR fetchers backed by one shared engine.
#[derive(Clone)]
pub struct OcrFetcherFactory {
    engine: Arc<OcrEngine>,
}

impl OcrFetcherFactory {
    pub fn new(engine: OcrEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

impl FetcherFactory for OcrFetcherFactory {
    fn fetcher_for(&self, image: DynamicImage) -> Result<Arc<dyn TextFetcher>, ScannerError> {
        let image = ImageProcessor::from_dynamic(image).grayscale().into_dynamic();
        Ok(Arc::new(OcrFetcher {
            engine: Arc::clone(&self.engine),
            image,
        }))
    }
}
