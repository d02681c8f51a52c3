// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text extraction pipeline: cancelable fetch runs, the result holder that
// receives their text, optical character recognition (OCR), and the workflow
// connecting a page selection to a recognition run.

pub mod fetch;
pub mod result;
pub mod workflow;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use fetch::{CancelAffordance, CancelToken, FetchController, FetchState, TextFetcher};
pub use result::ResultHolder;
pub use workflow::{FetcherFactory, OcrWorkflow, WorkflowOutcome};

#[cfg(feature = "ocr")]
pub use ocr::{OcrEngine, OcrFetcherFactory};
