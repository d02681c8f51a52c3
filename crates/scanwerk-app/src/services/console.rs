// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Terminal stand-ins for the message dialog and the cancel button.

use std::sync::Mutex;

use scanwerk_core::human_errors::{HumanMessage, MessageSink, Severity};
use scanwerk_document::{CancelAffordance, CancelToken};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Prints user-facing messages to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn report(&self, message: &HumanMessage) {
        eprintln!("{}", format_message(message));
    }
}

fn format_message(message: &HumanMessage) -> String {
    let label = match message.severity {
        Severity::Transient => "warning",
        Severity::ActionRequired | Severity::Permanent => "error",
    };
    format!("{label}: {}\n  {}", message.message, message.suggestion)
}

/// Ctrl-C cancels the run in flight.
#[derive(Default)]
pub struct CtrlCAffordance {
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl CtrlCAffordance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CancelAffordance for CtrlCAffordance {
    fn show(&self, token: &CancelToken) {
        eprintln!("Recognizing text... press Ctrl-C to cancel.");
        let token = token.clone();
        let handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    debug!("Ctrl-C received, cancelling recognition");
                    token.cancel();
                }
                Err(e) => warn!(error = %e, "could not listen for Ctrl-C"),
            }
        });
        if let Some(previous) = self
            .listener
            .lock()
            .expect("affordance lock poisoned")
            .replace(handle)
        {
            previous.abort();
        }
    }

    fn dismiss(&self) {
        if let Some(handle) = self.listener.lock().expect("affordance lock poisoned").take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_format_has_label_and_suggestion() {
        let text = format_message(&HumanMessage {
            message: "That tag is too long.".into(),
            suggestion: "Use a shorter tag name.".into(),
            severity: Severity::ActionRequired,
        });
        assert_eq!(text, "error: That tag is too long.\n  Use a shorter tag name.");
    }

    #[tokio::test]
    async fn dismiss_stops_listening() {
        let affordance = CtrlCAffordance::new();
        let token = CancelToken::new();
        affordance.show(&token);
        affordance.dismiss();
        assert!(affordance.listener.lock().expect("lock").is_none());
        assert!(!token.is_cancelled());
    }
}
