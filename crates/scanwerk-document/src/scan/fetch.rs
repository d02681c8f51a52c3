// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cancelable text fetch runs.
//
// A `FetchController` wraps an opaque, potentially slow `TextFetcher` (the OCR
// engine in production). Non-cancelable controllers run the fetch inline on
// the caller and always wait for it. Cancelable controllers run it on Tokio's
// blocking pool and race it against a `CancelToken`:
//
//   Idle -> Running -> Completed(text) | Canceled | Failed(err)
//
// Cancellation is cooperative. The worker is never interrupted; it is
// abandoned, and whatever it eventually returns is dropped with its join
// handle. The worker only ever hands its value back through that handle, so an
// abandoned run cannot touch caller-owned state.

use std::sync::{Arc, Mutex};

use scanwerk_core::error::FetchError;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// A blocking "extract text" operation.
pub trait TextFetcher: Send + Sync {
    fn fetch(&self) -> Result<String, FetchError>;
}

impl<F> TextFetcher for F
where
    F: Fn() -> Result<String, FetchError> + Send + Sync,
{
    fn fetch(&self) -> Result<String, FetchError> {
        self()
    }
}

/// Per-run cancellation signal shared between the caller and whatever UI
/// offers the "Cancel" control.
///
/// Clones share the same flag. Cancelling is idempotent and can't be undone;
/// use a fresh token for the next run.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        let mut rx = self.flag.subscribe();
        // The sender lives in `self`, so this can only return once the flag is set.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// The user-facing cancel control shown while a cancelable run is in flight.
///
/// `show` receives the run's token and should call [`CancelToken::cancel`]
/// when the user asks to abort. `dismiss` is called once the run is over,
/// whichever way it ended.
pub trait CancelAffordance: Send + Sync {
    fn show(&self, token: &CancelToken);
    fn dismiss(&self);
}

/// Lifecycle of the most recent run.
///
/// The terminal states double as idle: a new run may start from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Running,
    Completed,
    Canceled,
    Failed,
}

/// Runs a [`TextFetcher`], optionally letting the user cancel.
pub struct FetchController {
    fetcher: Arc<dyn TextFetcher>,
    cancelable: bool,
    affordance: Option<Arc<dyn CancelAffordance>>,
    state: Mutex<FetchState>,
    last_result: Mutex<Option<String>>,
}

impl FetchController {
    pub fn new(fetcher: Arc<dyn TextFetcher>, cancelable: bool) -> Self {
        Self {
            fetcher,
            cancelable,
            affordance: None,
            state: Mutex::new(FetchState::Idle),
            last_result: Mutex::new(None),
        }
    }

    /// Build a controller around a closure.
    pub fn from_fn<F>(fetch: F, cancelable: bool) -> Self
    where
        F: Fn() -> Result<String, FetchError> + Send + Sync + 'static,
    {
        Self::new(Arc::new(fetch), cancelable)
    }

    /// Attach the cancel control presented during cancelable runs.
    pub fn with_affordance(mut self, affordance: Arc<dyn CancelAffordance>) -> Self {
        self.affordance = Some(affordance);
        self
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn state(&self) -> FetchState {
        *self.state.lock().expect("fetch state lock poisoned")
    }

    /// Text of the most recent completed run. Canceled and failed runs leave it alone.
    pub fn last_result(&self) -> Option<String> {
        self.last_result
            .lock()
            .expect("fetch result lock poisoned")
            .clone()
    }

    /// Run the fetch once.
    ///
    /// Returns `Ok(Some(text))` on completion and `Ok(None)` when the run was
    /// canceled. Fetch failures are returned unchanged. Non-cancelable
    /// controllers ignore `cancel` and block the calling task until the fetch
    /// finishes.
    ///
    /// Every call is an independent run.
    #[instrument(skip_all, fields(run = %Uuid::new_v4(), cancelable = self.cancelable))]
    pub async fn start(&self, cancel: &CancelToken) -> Result<Option<String>, FetchError> {
        self.set_state(FetchState::Running);
        debug!("fetch run started");

        let outcome = if self.cancelable {
            self.run_cancelable(cancel).await
        } else {
            self.fetcher.fetch().map(Some)
        };

        match &outcome {
            Ok(Some(text)) => {
                info!(chars = text.chars().count(), "fetch completed");
                *self.last_result.lock().expect("fetch result lock poisoned") = Some(text.clone());
                self.set_state(FetchState::Completed);
            }
            Ok(None) => {
                info!("fetch canceled");
                self.set_state(FetchState::Canceled);
            }
            Err(e) => {
                warn!(error = %e, "fetch failed");
                self.set_state(FetchState::Failed);
            }
        }
        outcome
    }

    async fn run_cancelable(&self, cancel: &CancelToken) -> Result<Option<String>, FetchError> {
        if cancel.is_cancelled() {
            debug!("token already canceled, not dispatching");
            return Ok(None);
        }

        if let Some(affordance) = &self.affordance {
            affordance.show(cancel);
        }
        // Dismissed however the run ends, including when this future is dropped.
        let _dismiss = DismissOnDrop(self.affordance.as_deref());

        let fetcher = Arc::clone(&self.fetcher);
        let worker = tokio::task::spawn_blocking(move || fetcher.fetch());

        let outcome = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("cancel requested, abandoning worker");
                Ok(None)
            }

            joined = worker => {
                if cancel.is_cancelled() {
                    debug!("discarding result delivered after cancellation");
                    Ok(None)
                } else {
                    match joined {
                        Ok(result) => result.map(Some),
                        Err(join_err) => Err(FetchError::new(format!(
                            "fetch worker failed: {join_err}"
                        ))),
                    }
                }
            }
        };

        outcome
    }

    fn set_state(&self, state: FetchState) {
        *self.state.lock().expect("fetch state lock poisoned") = state;
    }
}

struct DismissOnDrop<'a>(Option<&'a dyn CancelAffordance>);

impl Drop for DismissOnDrop<'_> {
    fn drop(&mut self) {
        if let Some(affordance) = self.0 {
            affordance.dismiss();
        }
    }
}

impl std::fmt::Debug for FetchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchController")
            .field("cancelable", &self.cancelable)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
