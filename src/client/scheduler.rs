// Debounced check scheduler: turns a stream of edits into few checks.
//
// Every edit restarts a fixed timer; a check is issued only when the timer
// elapses without another edit. Each edit or submit bumps a generation
// counter, and a response is displayed only if its generation is still the
// newest when it arrives. Stale responses are dropped on arrival; the
// request itself is left to finish (cancellation is result-level only).
//
// The displayed state is published on a tokio watch channel so a UI (or
// the CLI composer) can render every change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::Checker;
use crate::moderation::Verdict;

/// Message shown when the check itself could not be completed.
pub const CHECK_FAILED_MESSAGE: &str = "Failed to check message";

/// What the composer should currently show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    /// Text the displayed verdict (or error) belongs to.
    pub text: Option<String>,
    pub verdict: Option<Verdict>,
    pub error: Option<String>,
    /// True while the newest issued check has not answered yet.
    pub checking: bool,
}

/// Debounces edits and enforces "latest input wins" on responses.
pub struct CheckScheduler<C: Checker> {
    inner: Arc<Inner<C>>,
}

struct Inner<C> {
    checker: C,
    window: Duration,
    tracking: Mutex<Tracking>,
    display: watch::Sender<DisplayState>,
    issued: AtomicU64,
}

#[derive(Default)]
struct Tracking {
    /// Bumped on every edit and submit.
    generation: u64,
    /// Debounce timer for the newest edit, if it has not fired yet.
    pending: Option<JoinHandle<()>>,
}

impl<C: Checker> CheckScheduler<C> {
    /// Create a scheduler with the given debounce window.
    pub fn new(checker: C, window: Duration) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            inner: Arc::new(Inner {
                checker,
                window,
                tracking: Mutex::new(Tracking::default()),
                display,
                issued: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to display changes.
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.inner.display.subscribe()
    }

    /// Current display state.
    pub fn display(&self) -> DisplayState {
        self.inner.display.borrow().clone()
    }

    /// Number of checks issued so far.
    pub fn issued(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Record an edit. Restarts the debounce timer; empty text clears the
    /// display at once and schedules nothing.
    pub fn edit(&self, text: &str) {
        let mut tracking = self.inner.supersede();
        let generation = tracking.generation;

        if text.trim().is_empty() {
            self.inner.display.send_replace(DisplayState::default());
            return;
        }

        let inner = Arc::clone(&self.inner);
        let text = text.to_string();
        tracking.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(inner.window).await;
            // Past this point the timer can no longer be cancelled; the
            // check runs detached and is judged by generation on arrival.
            Inner::issue(inner, generation, text);
        }));
    }

    /// Check `text` now, skipping the debounce window. Any pending timer is
    /// cancelled and responses for earlier checks become stale.
    pub fn submit(&self, text: &str) {
        let tracking = self.inner.supersede();
        let generation = tracking.generation;
        drop(tracking);

        if text.trim().is_empty() {
            self.inner.display.send_replace(DisplayState::default());
            return;
        }

        Inner::issue(Arc::clone(&self.inner), generation, text.to_string());
    }
}

impl<C: Checker> Drop for CheckScheduler<C> {
    fn drop(&mut self) {
        if let Some(pending) = self.inner.lock().pending.take() {
            pending.abort();
        }
    }
}

impl<C: Checker> Inner<C> {
    fn lock(&self) -> MutexGuard<'_, Tracking> {
        self.tracking.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new generation and cancel the pending timer. Any in-flight
    /// check is now stale, so `checking` is cleared. Returns the lock so
    /// callers can finish their bookkeeping atomically.
    fn supersede(&self) -> MutexGuard<'_, Tracking> {
        let mut tracking = self.lock();
        tracking.generation += 1;
        if let Some(pending) = tracking.pending.take() {
            pending.abort();
        }
        self.display
            .send_if_modified(|d| std::mem::replace(&mut d.checking, false));
        tracking
    }

    /// Issue one check in its own task.
    fn issue(inner: Arc<Self>, generation: u64, text: String) {
        {
            let tracking = inner.lock();
            if tracking.generation != generation {
                return;
            }
            inner.issued.fetch_add(1, Ordering::SeqCst);
            inner.display.send_modify(|d| d.checking = true);
        }

        tokio::spawn(async move {
            let result = inner.checker.check(&text).await;

            // Hold the lock while publishing so an edit cannot slip in
            // between the generation check and the display update.
            let tracking = inner.lock();
            if tracking.generation != generation {
                debug!(
                    generation,
                    current = tracking.generation,
                    "Discarding stale check response"
                );
                return;
            }

            let state = match result {
                Ok(verdict) => DisplayState {
                    text: Some(text),
                    verdict: Some(verdict),
                    error: None,
                    checking: false,
                },
                Err(e) => {
                    warn!(error = %e, "Check request failed");
                    DisplayState {
                        text: Some(text),
                        verdict: None,
                        error: Some(CHECK_FAILED_MESSAGE.to_string()),
                        checking: false,
                    }
                }
            };
            inner.display.send_replace(state);
        });
    }
}
