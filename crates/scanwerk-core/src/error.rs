// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScannerError {
    // -- Tag storage --
    #[error(transparent)]
    TagRetrieval(#[from] TagRetrievalError),

    // -- Text extraction --
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("OCR support is not available in this build")]
    OcrUnavailable,

    // -- Images and selection --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("invalid zoom level {0}: must be a finite number greater than zero")]
    InvalidZoom(f32),

    // -- Persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reading or writing the tag file.
///
/// A clean end-of-stream after the last complete record is never an error.
#[derive(Debug, Error)]
pub enum TagRetrievalError {
    #[error("tag file {path} could not be accessed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tag file is truncated: incomplete record at byte {offset}")]
    Truncated { offset: usize },

    #[error("tag file is corrupt: record at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("tag is {len} bytes long; at most {} bytes can be stored", u16::MAX)]
    TagTooLong { len: usize },
}

/// Opaque failure reported by a text fetch operation.
///
/// Scanwerk has no extra context to add, so the message is passed through to
/// the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("text fetch failed: {0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_passes_through_transparently() {
        let err: ScannerError = FetchError::new("engine crashed").into();
        assert_eq!(err.to_string(), "text fetch failed: engine crashed");
    }

    #[test]
    fn tag_too_long_mentions_limit() {
        let err = TagRetrievalError::TagTooLong { len: 70_000 };
        assert!(err.to_string().contains("65535"));
    }
}
