// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk: Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod listeners;
pub mod types;

pub use config::ScannerConfig;
pub use error::{FetchError, ScannerError, TagRetrievalError};
pub use human_errors::{HumanMessage, MessageSink};
pub use listeners::ListenerSet;
pub use types::*;
