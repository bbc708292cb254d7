//! Testing utilities for waypost.
//!
//! Listeners with observable side effects, for asserting on event delivery:
//!
//! - [`CallLog`] / [`RecordingListener`]: append `label:event` to a shared log
//! - [`CountingListener`]: count invocations
//! - [`FailingListener`]: always return an error
//! - [`PanickingListener`]: always panic

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use waypost_core::{BoxError, Listener, Payload};

// ============================================================================
// Recording
// ============================================================================

/// A log shared by several [`RecordingListener`]s.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// bus.on("x", log.listener("first"), None);
/// bus.on("x", log.listener("second"), None);
/// bus.trigger("x", &(), None);
/// assert_eq!(log.entries(), ["first:x", "second:x"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener that appends `label:event` to this log.
    pub fn listener(&self, label: impl Into<String>) -> RecordingListener {
        RecordingListener {
            label: label.into(),
            log: self.clone(),
        }
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// Appends `label:event` to its [`CallLog`] on every invocation.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    label: String,
    log: CallLog,
}

impl RecordingListener {
    /// Create a listener with its own log.
    pub fn new(label: impl Into<String>) -> Self {
        CallLog::new().listener(label)
    }

    /// The log this listener writes to.
    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl Listener for RecordingListener {
    fn on_event(&self, event: &str, _payload: &Payload) -> Result<(), BoxError> {
        self.log.entries.lock().push(format!("{}:{event}", self.label));
        Ok(())
    }
}

// ============================================================================
// Counting
// ============================================================================

/// Counts invocations. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingListener {
    count: Arc<AtomicUsize>,
}

impl CountingListener {
    /// Create a listener with a zero count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invocations so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the count to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl Listener for CountingListener {
    fn on_event(&self, _event: &str, _payload: &Payload) -> Result<(), BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Failure
// ============================================================================

/// Returns an error carrying a fixed message.
#[derive(Debug, Clone)]
pub struct FailingListener {
    message: String,
}

impl FailingListener {
    /// Create a listener that fails with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Listener for FailingListener {
    fn on_event(&self, _event: &str, _payload: &Payload) -> Result<(), BoxError> {
        Err(self.message.clone().into())
    }
}

/// Panics with a fixed message.
#[derive(Debug, Clone)]
pub struct PanickingListener {
    message: String,
}

impl PanickingListener {
    /// Create a listener that panics with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Listener for PanickingListener {
    fn on_event(&self, _event: &str, _payload: &Payload) -> Result<(), BoxError> {
        panic!("{}", self.message)
    }
}
