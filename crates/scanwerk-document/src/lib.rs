// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-document: Document-side logic for the Scanwerk scanner.
//
// Provides image loading and cropping, the region-selection model for a
// displayed page, and the text extraction pipeline (cancelable fetch
// controller, result holder, optional OCR engine, and the workflow that ties
// a selection to a recognition run).

pub mod image;
pub mod scan;
pub mod selection;

// Re-export the primary structs so callers can use `scanwerk_document::SelectionModel` etc.
pub use self::image::processor::ImageProcessor;
pub use scan::fetch::{CancelAffordance, CancelToken, FetchController, FetchState, TextFetcher};
pub use scan::result::ResultHolder;
pub use scan::workflow::{FetcherFactory, OcrWorkflow, WorkflowOutcome};
pub use selection::SelectionModel;

#[cfg(feature = "ocr")]
pub use scan::ocr::{OcrEngine, OcrFetcherFactory};
