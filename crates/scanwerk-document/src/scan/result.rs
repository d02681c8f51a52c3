// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Holder for the last recognized or edited text.

use scanwerk_core::listeners::{Listener, ListenerSet};
use tracing::debug;

/// The text shown next to a page: the last OCR result, or whatever the user
/// typed over it.
///
/// Direct edits through [`set_value`](Self::set_value) are silent. Listeners
/// only hear about newly accepted fetch results, which is what other
/// components coordinate on.
#[derive(Debug)]
pub struct ResultHolder {
    initial_value: Option<String>,
    current_value: String,
    update_listeners: ListenerSet,
}

impl ResultHolder {
    pub fn new(initial_value: Option<String>) -> Self {
        let current_value = initial_value.clone().unwrap_or_default();
        Self {
            initial_value,
            current_value,
            update_listeners: ListenerSet::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.current_value
    }

    pub fn initial_value(&self) -> Option<&str> {
        self.initial_value.as_deref()
    }

    /// Replace the text without notifying listeners.
    pub fn set_value(&mut self, text: impl Into<String>) {
        self.current_value = text.into();
    }

    /// Restore the constructor-supplied text, or the empty string.
    pub fn reset(&mut self) {
        self.current_value = self.initial_value.clone().unwrap_or_default();
    }

    /// Take the outcome of a fetch run.
    ///
    /// `Some(text)` replaces the value and notifies listeners; `None` (a
    /// canceled run) leaves everything as it was. Returns whether the value
    /// was replaced.
    pub fn accept_fetch_result(&mut self, result: Option<String>) -> bool {
        match result {
            Some(text) => {
                debug!(chars = text.chars().count(), "accepting fetch result");
                self.current_value = text;
                self.update_listeners.notify();
                true
            }
            None => false,
        }
    }

    pub fn add_listener(&mut self, listener: Listener) -> bool {
        self.update_listeners.add(listener)
    }

    pub fn remove_listener(&mut self, listener: &Listener) -> bool {
        self.update_listeners.remove(listener)
    }
}

impl Default for ResultHolder {
    fn default() -> Self {
        Self::new(None)
    }
}
