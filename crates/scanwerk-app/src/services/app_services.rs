// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Owns the configuration and the tag store, and runs
// region recognition for the command-line front end.
//
// Failures are reported through the message sink before being returned, so
// the caller only needs to pick an exit code.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::human_errors::{MessageSink, humanize_error};
use scanwerk_core::types::Point;
use scanwerk_core::ScannerConfig;
use scanwerk_document::{
    CancelToken, ImageProcessor, OcrWorkflow, ResultHolder, SelectionModel, WorkflowOutcome,
};
use scanwerk_storage::{FileTagStore, TagStorage};
use tracing::{info, instrument, warn};

use super::console::CtrlCAffordance;
use super::data_dir;

const CONFIG_FILE: &str = "config.json";

/// One recognition request from the command line.
#[derive(Debug, Clone, Default)]
pub struct RecognizeRequest {
    pub image: PathBuf,
    /// Drag start and end in display coordinates.
    pub selection: Option<(Point, Point)>,
    /// Display zoom the selection was made at. Defaults to the configured zoom.
    pub zoom: Option<f32>,
    /// Force a non-cancelable run regardless of configuration.
    pub no_cancel: bool,
    /// Also write the selected pixels here.
    pub save_selection: Option<PathBuf>,
}

/// Application services shared by all commands.
pub struct AppServices<S> {
    data_dir: PathBuf,
    config: ScannerConfig,
    tags: FileTagStore,
    sink: S,
}

impl<S: MessageSink> AppServices<S> {
    /// Initialise services in the default data directory.
    pub fn init(sink: S) -> Self {
        Self::with_data_dir(data_dir::data_dir(), sink)
    }

    /// Initialise services rooted at `dir`.
    pub fn with_data_dir(dir: impl Into<PathBuf>, sink: S) -> Self {
        let dir = data_dir::data_dir_at(dir);
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();
        let tags = FileTagStore::new(config.tag_file_in(&dir));

        Self {
            data_dir: dir,
            config,
            tags,
            sink,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Persist new settings. The tag store follows a changed `tag_file`.
    #[instrument(skip_all)]
    pub fn save_config(&mut self, config: ScannerConfig) -> Result<()> {
        if !(config.default_zoom.is_finite() && config.default_zoom > 0.0) {
            return Err(self.report(ScannerError::InvalidZoom(config.default_zoom)));
        }
        persist_config(&self.data_dir, &config).map_err(|e| self.report(e))?;
        self.tags = FileTagStore::new(config.tag_file_in(&self.data_dir));
        self.config = config;
        info!("configuration saved");
        Ok(())
    }

    // -- Tags ----------------------------------------------------------------

    pub fn tag_file(&self) -> &Path {
        self.tags.path()
    }

    pub fn list_tags(&self) -> Result<BTreeSet<String>> {
        self.tags
            .available_tags()
            .map_err(|e| self.report(e.into()))
    }

    pub fn add_tag(&self, tag: &str) -> Result<()> {
        self.tags.add_tag(tag).map_err(|e| self.report(e.into()))
    }

    pub fn remove_tag(&self, tag: &str) -> Result<()> {
        self.tags.remove_tag(tag).map_err(|e| self.report(e.into()))
    }

    // -- Recognition ---------------------------------------------------------

    /// Recognize text in the requested region of an image.
    ///
    /// Returns `Ok(None)` when the user canceled.
    #[instrument(skip_all, fields(image = %request.image.display()))]
    pub async fn recognize(&self, request: &RecognizeRequest) -> Result<Option<String>> {
        let selection = self
            .prepare_selection(request)
            .map_err(|e| self.report(e))?;

        if let Some(path) = &request.save_selection {
            ImageProcessor::from_dynamic(selection.selected_image())
                .save(path)
                .map_err(|e| self.report(e))?;
            info!(path = %path.display(), "selection saved");
        }

        let factory = ocr_factory(&self.config).map_err(|e| self.report(e))?;
        let cancelable = self.config.cancelable_ocr && !request.no_cancel;
        let workflow = OcrWorkflow::new(factory, &self.sink, cancelable)
            .with_affordance(Arc::new(CtrlCAffordance::new()));

        let mut holder = ResultHolder::default();
        match workflow.run(&selection, &mut holder, &CancelToken::new()).await? {
            WorkflowOutcome::Recognized => Ok(Some(holder.value().to_owned())),
            WorkflowOutcome::Canceled => Ok(None),
        }
    }

    fn prepare_selection(&self, request: &RecognizeRequest) -> Result<SelectionModel> {
        let page = ImageProcessor::open(&request.image)?.into_dynamic();
        let mut selection = SelectionModel::new(page)?;
        selection.set_zoom_level(request.zoom.unwrap_or(self.config.default_zoom))?;

        if let Some((start, end)) = request.selection {
            selection.press(start);
            selection.drag(end);
            selection.release(end);
        }
        Ok(selection)
    }

    fn report(&self, err: ScannerError) -> ScannerError {
        self.sink.report(&humanize_error(&err));
        err
    }
}

#[cfg(feature = "ocr")]
fn ocr_factory(config: &ScannerConfig) -> Result<scanwerk_document::OcrFetcherFactory> {
    use scanwerk_document::scan::ocr::{OcrConfig, OcrEngine};

    let engine = OcrEngine::new(OcrConfig::from_optional_dir(config.ocr_model_dir.as_deref()))?;
    Ok(scanwerk_document::OcrFetcherFactory::new(engine))
}

#[cfg(not(feature = "ocr"))]
type UnavailableFactory =
    fn(image::DynamicImage) -> Result<Arc<dyn scanwerk_document::TextFetcher>>;

#[cfg(not(feature = "ocr"))]
fn ocr_factory(_config: &ScannerConfig) -> Result<UnavailableFactory> {
    Ok(|_| Err(ScannerError::OcrUnavailable))
}

fn load_config(data_dir: &Path) -> Option<ScannerConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

fn persist_config(data_dir: &Path, config: &ScannerConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use image::{DynamicImage, Rgb, RgbImage};
    use scanwerk_core::human_errors::HumanMessage;

    #[derive(Default)]
    struct RecordingSink {
        messages: RefCell<Vec<HumanMessage>>,
    }

    impl MessageSink for RecordingSink {
        fn report(&self, message: &HumanMessage) {
            self.messages.borrow_mut().push(message.clone());
        }
    }

    fn services(dir: &tempfile::TempDir) -> AppServices<RecordingSink> {
        AppServices::with_data_dir(dir.path(), RecordingSink::default())
    }

    fn write_page(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("page.png");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(800, 600, Rgb([255, 255, 255])))
            .save(&path)
            .expect("write page");
        path
    }

    #[test]
    fn tags_round_trip_through_services() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        svc.add_tag("receipt").expect("add");
        svc.add_tag("tax-2026").expect("add");
        svc.remove_tag("receipt").expect("remove");
        let tags = svc.list_tags().expect("list");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["tax-2026".to_string()]);
        assert_eq!(svc.tag_file(), dir.path().join("tags.bin"));
    }

    #[test]
    fn tag_failure_reaches_sink() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        std::fs::write(svc.tag_file(), [0u8, 9]).expect("corrupt");
        assert!(svc.list_tags().is_err());
        assert_eq!(svc.sink.messages.borrow().len(), 1);
    }

    #[test]
    fn config_persists_and_moves_tag_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut svc = services(&dir);
        let custom = dir.path().join("labels/tags.bin");
        svc.save_config(ScannerConfig {
            tag_file: Some(custom.clone()),
            cancelable_ocr: false,
            ..Default::default()
        })
        .expect("save");
        assert_eq!(svc.tag_file(), custom);

        let reopened = services(&dir);
        assert!(!reopened.config().cancelable_ocr);
        assert_eq!(reopened.tag_file(), custom);
    }

    #[test]
    fn invalid_default_zoom_is_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut svc = services(&dir);
        let err = svc
            .save_config(ScannerConfig {
                default_zoom: 0.0,
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ScannerError::InvalidZoom(_)));
        assert!(!dir.path().join(CONFIG_FILE).exists());
        assert_eq!(svc.sink.messages.borrow().len(), 1);
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").expect("write");
        let svc = services(&dir);
        assert_eq!(svc.config(), &ScannerConfig::default());
    }

    #[tokio::test]
    async fn invalid_zoom_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        let request = RecognizeRequest {
            image: write_page(&dir),
            zoom: Some(0.0),
            ..Default::default()
        };
        let err = svc.recognize(&request).await.unwrap_err();
        assert!(matches!(err, ScannerError::InvalidZoom(_)));
        assert_eq!(svc.sink.messages.borrow().len(), 1);
    }

    #[tokio::test]
    async fn missing_image_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        let request = RecognizeRequest {
            image: dir.path().join("nope.png"),
            ..Default::default()
        };
        let err = svc.recognize(&request).await.unwrap_err();
        assert!(matches!(err, ScannerError::ImageError(_)));
    }

    #[tokio::test]
    async fn selection_is_saved_before_recognition() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        let crop = dir.path().join("crop.png");
        let request = RecognizeRequest {
            image: write_page(&dir),
            selection: Some((Point::new(10, 10), Point::new(220, 160))),
            save_selection: Some(crop.clone()),
            no_cancel: true,
            ..Default::default()
        };
        // Recognition itself may or may not be compiled in; the crop is written either way.
        let _ = svc.recognize(&request).await;
        let saved = image::open(&crop).expect("crop written");
        assert_eq!((saved.width(), saved.height()), (210, 150));
    }

    #[cfg(not(feature = "ocr"))]
    #[tokio::test]
    async fn recognition_without_ocr_feature_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = services(&dir);
        let request = RecognizeRequest {
            image: write_page(&dir),
            ..Default::default()
        };
        let err = svc.recognize(&request).await.unwrap_err();
        assert!(matches!(err, ScannerError::OcrUnavailable));
        let messages = svc.sink.messages.borrow();
        assert_eq!(messages.len(), 1, "reported exactly once");
    }
}
