// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Tag file location. `None` means `tags.bin` inside the data directory.
    pub tag_file: Option<PathBuf>,
    /// Whether interactive OCR runs can be cancelled by the user.
    pub cancelable_ocr: bool,
    /// Zoom factor applied to newly opened images.
    pub default_zoom: f32,
    /// Directory holding the OCR models. `None` uses the model cache directory.
    pub ocr_model_dir: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            tag_file: None,
            cancelable_ocr: true,
            default_zoom: 1.0,
            ocr_model_dir: None,
        }
    }
}

impl ScannerConfig {
    /// Resolve the tag file path against the data directory.
    pub fn tag_file_in(&self, data_dir: &std::path::Path) -> PathBuf {
        self.tag_file
            .clone()
            .unwrap_or_else(|| data_dir.join(DEFAULT_TAG_FILE))
    }
}

/// File name of the tag store inside the data directory.
pub const DEFAULT_TAG_FILE: &str = "tags.bin";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let config: ScannerConfig =
            serde_json::from_str(r#"{ "cancelable_ocr": false }"#).expect("parse");
        assert!(!config.cancelable_ocr);
        assert_eq!(config.default_zoom, 1.0);
        assert!(config.tag_file.is_none());
    }

    #[test]
    fn tag_file_defaults_into_data_dir() {
        let config = ScannerConfig::default();
        assert_eq!(
            config.tag_file_in(std::path::Path::new("/data/scanwerk")),
            PathBuf::from("/data/scanwerk/tags.bin")
        );
    }

    #[test]
    fn explicit_tag_file_wins() {
        let config = ScannerConfig {
            tag_file: Some(PathBuf::from("/elsewhere/labels.bin")),
            ..Default::default()
        };
        assert_eq!(
            config.tag_file_in(std::path::Path::new("/data/scanwerk")),
            PathBuf::from("/elsewhere/labels.bin")
        );
    }
}
