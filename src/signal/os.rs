//! The real OS color mode, via `dark-light`.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use super::{Hub, Listener, Subscription, SystemSignal};
use crate::sync::lock;
use crate::theme::ColorMode;

/// Function that reports the current OS color mode.
pub type Detector = fn() -> ColorMode;

static SYSTEM_DETECTOR: Lazy<Mutex<Detector>> = Lazy::new(|| Mutex::new(os_theme_detector));

/// Overrides the detector used by every [`OsSignal`] without its own.
///
/// This is useful for testing or when you want to force a specific color mode.
pub fn set_system_detector(detector: Detector) {
    *lock(&SYSTEM_DETECTOR) = detector;
}

/// Restores OS detection after [`set_system_detector`].
pub fn reset_system_detector() {
    set_system_detector(os_theme_detector);
}

#[allow(unreachable_patterns)]
fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        OsThemeMode::Light => ColorMode::Light,
        // Undetectable environments fall back to light.
        _ => ColorMode::Light,
    }
}

/// The operating system's dark-mode setting.
///
/// `dark-light` only answers "what is it now", so changes are found by
/// polling: call [`poll`](OsSignal::poll) from an event loop, or let
/// [`watch`](OsSignal::watch) do it on a background thread.
///
/// # Example
///
/// ```rust
/// use colormode::{ColorMode, OsSignal, SystemSignal};
///
/// let signal = OsSignal::with_detector(|| ColorMode::Dark);
/// assert_eq!(signal.current(), ColorMode::Dark);
/// ```
pub struct OsSignal {
    detector: Option<Detector>,
    last: Mutex<ColorMode>,
    hub: Hub,
}

impl OsSignal {
    /// Creates a signal using the process-wide detector.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a signal with its own detector, ignoring the process-wide one.
    pub fn with_detector(detector: Detector) -> Self {
        Self::build(Some(detector))
    }

    fn build(detector: Option<Detector>) -> Self {
        let signal = Self {
            detector,
            last: Mutex::new(ColorMode::Light),
            hub: Hub::new(),
        };
        *lock(&signal.last) = signal.detect();
        signal
    }

    fn detect(&self) -> ColorMode {
        match self.detector {
            Some(detector) => detector(),
            None => {
                let detector = *lock(&SYSTEM_DETECTOR);
                detector()
            }
        }
    }

    /// Re-reads the OS setting and notifies listeners if it changed since the
    /// last poll.
    ///
    /// Returns the new mode when it changed.
    pub fn poll(&self) -> Option<ColorMode> {
        let mode = self.detect();
        {
            let mut last = lock(&self.last);
            if *last == mode {
                return None;
            }
            *last = mode;
            self.hub.enqueue(mode);
        }
        debug!(%mode, "OS color mode changed");
        self.hub.drain();
        Some(mode)
    }

    /// Polls every `interval` on a background thread.
    ///
    /// The thread stops when the returned handle is dropped or the signal
    /// itself is dropped.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> WatchHandle {
        let (stop, stopped) = mpsc::channel::<()>();
        let signal: Weak<Self> = Arc::downgrade(self);
        let spawned = thread::Builder::new()
            .name("colormode-watch".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => match signal.upgrade() {
                        Some(signal) => {
                            signal.poll();
                        }
                        None => break,
                    },
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            });
        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "could not start OS color mode watcher");
                None
            }
        };
        WatchHandle {
            stop: Some(stop),
            thread,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }
}

impl Default for OsSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSignal for OsSignal {
    fn current(&self) -> ColorMode {
        self.detect()
    }

    fn on_change(&self, listener: Listener) -> Subscription {
        self.hub.subscribe(listener)
    }
}

impl std::fmt::Debug for OsSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsSignal")
            .field("last", &*lock(&self.last))
            .field("custom_detector", &self.detector.is_some())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Keeps an [`OsSignal::watch`] thread alive. Dropping it stops the thread.
#[derive(Debug)]
pub struct WatchHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Whether the watcher thread was started and has not exited.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.thread.take() {
            // A listener on the watcher thread may drop the handle itself.
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
