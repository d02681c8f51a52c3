// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-aware data directory resolution.

use std::path::{Path, PathBuf};

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir(
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
    .join("scanwerk");
    ensure(&dir);
    dir
}

/// Use `dir` as the data directory, creating it if needed.
pub fn data_dir_at(dir: impl Into<PathBuf>) -> PathBuf {
    let dir = dir.into();
    ensure(&dir);
    dir
}

fn ensure(dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(path = %dir.display(), error = %e, "could not create data directory");
    }
}

fn base_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    // Try XDG data dir, then fallback to home
    if let Some(xdg) = xdg_data_home.filter(|p| p.is_absolute()) {
        return xdg;
    }
    if let Some(home) = home {
        return home.join(".local").join("share");
    }
    // Last resort
    std::env::temp_dir()
}
