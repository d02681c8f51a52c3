// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages and the sink that surfaces them to the user.
//
// Only failure paths reach the sink. A cancelled OCR run is not a failure and
// never produces a message.

use crate::error::{ScannerError, TagRetrievalError};

/// Severity of a message from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying again may well work.
    Transient,
    /// The user must do something first (pick another image, fix a path).
    ActionRequired,
    /// Retrying won't help; the data or build is the problem.
    Permanent,
}

/// A plain-language message with an actionable suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanMessage {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Drives icon/colour in whatever front end shows it.
    pub severity: Severity,
}

/// Capability to show a message to the user.
pub trait MessageSink {
    fn report(&self, message: &HumanMessage);
}

impl<T: MessageSink + ?Sized> MessageSink for &T {
    fn report(&self, message: &HumanMessage) {
        (**self).report(message)
    }
}

/// Convert a `ScannerError` into a `HumanMessage`.
pub fn humanize_error(err: &ScannerError) -> HumanMessage {
    match err {
        ScannerError::TagRetrieval(tag_err) => humanize_tag_error(tag_err),

        ScannerError::Fetch(fetch_err) => HumanMessage {
            message: "Text recognition failed.".into(),
            suggestion: format!(
                "Try again, or select a smaller, clearer part of the page. ({})",
                fetch_err.message()
            ),
            severity: Severity::Transient,
        },

        ScannerError::OcrError(detail) => HumanMessage {
            message: "The text recognition engine could not start.".into(),
            suggestion: format!("Check that the OCR model files are installed. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScannerError::OcrUnavailable => HumanMessage {
            message: "Text recognition isn't included in this version.".into(),
            suggestion: "Install a build with OCR support enabled.".into(),
            severity: Severity::Permanent,
        },

        ScannerError::ImageError(detail) => HumanMessage {
            message: "This image couldn't be opened.".into(),
            suggestion: format!("Try scanning the page again or pick a different file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        ScannerError::InvalidZoom(factor) => HumanMessage {
            message: "That zoom level isn't possible.".into(),
            suggestion: format!("Choose a zoom above zero (you asked for {factor})."),
            severity: Severity::ActionRequired,
        },

        ScannerError::Io(io_err) => HumanMessage {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the disk has space and the folder is writable. ({io_err})"),
            severity: Severity::Transient,
        },

        ScannerError::Serialization(detail) => HumanMessage {
            message: "Saved settings couldn't be read.".into(),
            suggestion: format!("The settings file may be damaged; defaults will be used. ({detail})"),
            severity: Severity::Permanent,
        },
    }
}

fn humanize_tag_error(err: &TagRetrievalError) -> HumanMessage {
    match err {
        TagRetrievalError::Io { path, .. } => HumanMessage {
            message: "Your tags couldn't be loaded or saved.".into(),
            suggestion: format!(
                "Check that {} is accessible and the disk isn't full.",
                path.display()
            ),
            severity: Severity::Transient,
        },
        TagRetrievalError::Truncated { .. } | TagRetrievalError::InvalidUtf8 { .. } => {
            HumanMessage {
                message: "The tag file is damaged.".into(),
                suggestion: format!("Restore it from a backup or remove it to start over. ({err})"),
                severity: Severity::Permanent,
            }
        }
        TagRetrievalError::TagTooLong { .. } => HumanMessage {
            message: "That tag is too long.".into(),
            suggestion: "Use a shorter tag name.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
