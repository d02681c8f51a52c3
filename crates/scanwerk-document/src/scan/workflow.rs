// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection -> recognition -> result.
//
// The selected pixels are copied out on the caller's thread before anything
// runs elsewhere, so the worker never sees the selection model itself.

use std::sync::Arc;

use image::DynamicImage;
use scanwerk_core::error::{Result, ScannerError};
use scanwerk_core::human_errors::{MessageSink, humanize_error};
use tracing::{info, instrument};

use crate::scan::fetch::{CancelAffordance, CancelToken, FetchController, TextFetcher};
use crate::scan::result::ResultHolder;
use crate::selection::SelectionModel;

/// Builds a fetch operation for a specific image.
pub trait FetcherFactory {
    fn fetcher_for(&self, image: DynamicImage) -> Result<Arc<dyn TextFetcher>>;
}

impl<F> FetcherFactory for F
where
    F: Fn(DynamicImage) -> Result<Arc<dyn TextFetcher>>,
{
    fn fetcher_for(&self, image: DynamicImage) -> Result<Arc<dyn TextFetcher>> {
        self(image)
    }
}

/// How a workflow run ended, when it didn't fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// New text was stored in the result holder.
    Recognized,
    /// The user canceled; the result holder is untouched.
    Canceled,
}

/// Runs recognition over the current selection and files the result.
pub struct OcrWorkflow<F, S> {
    factory: F,
    sink: S,
    cancelable: bool,
    affordance: Option<Arc<dyn CancelAffordance>>,
}

impl<F: FetcherFactory, S: MessageSink> OcrWorkflow<F, S> {
    pub fn new(factory: F, sink: S, cancelable: bool) -> Self {
        Self {
            factory,
            sink,
            cancelable,
            affordance: None,
        }
    }

    pub fn with_affordance(mut self, affordance: Arc<dyn CancelAffordance>) -> Self {
        self.affordance = Some(affordance);
        self
    }

    /// Recognize the selected region (or the whole page) into `holder`.
    ///
    /// Failures are reported through the message sink and then returned. A
    /// canceled run is not a failure and produces no message.
    #[instrument(skip_all, fields(cancelable = self.cancelable))]
    pub async fn run(
        &self,
        selection: &SelectionModel,
        holder: &mut ResultHolder,
        cancel: &CancelToken,
    ) -> Result<WorkflowOutcome> {
        let image = selection.selected_image();
        info!(
            width = image.width(),
            height = image.height(),
            "running recognition"
        );

        match self.fetch(image, cancel).await {
            Ok(text) => {
                if holder.accept_fetch_result(text) {
                    Ok(WorkflowOutcome::Recognized)
                } else {
                    Ok(WorkflowOutcome::Canceled)
                }
            }
            Err(err) => {
                self.sink.report(&humanize_error(&err));
                Err(err)
            }
        }
    }

    async fn fetch(&self, image: DynamicImage, cancel: &CancelToken) -> Result<Option<String>> {
        let fetcher = self.factory.fetcher_for(image)?;
        let mut controller = FetchController::new(fetcher, self.cancelable);
        if let Some(affordance) = &self.affordance {
            controller = controller.with_affordance(Arc::clone(affordance));
        }
        controller.start(cancel).await.map_err(ScannerError::from)
    }
}
