//! A system signal driven by the host application.

use std::sync::Mutex;

use tracing::debug;

use super::{Hub, Listener, Subscription, SystemSignal};
use crate::sync::lock;
use crate::theme::ColorMode;

/// A [`SystemSignal`] whose value is set explicitly.
///
/// Useful when the host already receives OS appearance events through its
/// own windowing layer, and in tests.
pub struct ManualSignal {
    mode: Mutex<ColorMode>,
    hub: Hub,
}

impl ManualSignal {
    pub fn new(initial: ColorMode) -> Self {
        Self {
            mode: Mutex::new(initial),
            hub: Hub::new(),
        }
    }

    /// Updates the signal, notifying listeners if the value changed.
    ///
    /// Returns whether it changed.
    pub fn set(&self, mode: ColorMode) -> bool {
        {
            let mut current = lock(&self.mode);
            if *current == mode {
                return false;
            }
            *current = mode;
            self.hub.enqueue(mode);
        }
        debug!(%mode, "system color mode changed");
        self.hub.drain();
        true
    }

    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }
}

impl Default for ManualSignal {
    fn default() -> Self {
        Self::new(ColorMode::Light)
    }
}

impl SystemSignal for ManualSignal {
    fn current(&self) -> ColorMode {
        *lock(&self.mode)
    }

    fn on_change(&self, listener: Listener) -> Subscription {
        self.hub.subscribe(listener)
    }
}

impl std::fmt::Debug for ManualSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSignal")
            .field("mode", &self.current())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::subscribe_to_system_signal;
    use std::sync::Arc;

    #[test]
    fn test_set_notifies_only_on_change() {
        let signal = ManualSignal::new(ColorMode::Light);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = subscribe_to_system_signal(&signal, move |m| sink.lock().unwrap().push(m));

        assert!(!signal.set(ColorMode::Light));
        assert!(signal.set(ColorMode::Dark));
        assert!(!signal.set(ColorMode::Dark));
        assert!(signal.set(ColorMode::Light));

        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark, ColorMode::Light]);
        assert_eq!(signal.current(), ColorMode::Light);
    }

    #[test]
    fn test_unsubscribe_guarantee() {
        let signal = ManualSignal::default();
        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let sub = subscribe_to_system_signal(&signal, move |_| *sink.lock().unwrap() += 1);

        signal.set(ColorMode::Dark);
        sub.unsubscribe();
        signal.set(ColorMode::Light);
        signal.set(ColorMode::Dark);
        sub.unsubscribe();

        assert_eq!(*seen.lock().unwrap(), 1);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn test_listener_can_read_current_value() {
        let signal = Arc::new(ManualSignal::default());
        let seen = Arc::new(Mutex::new(None));
        let (reader, sink) = (Arc::clone(&signal), Arc::clone(&seen));
        let _sub = subscribe_to_system_signal(&*signal, move |_| {
            *sink.lock().unwrap() = Some(reader.current());
        });

        signal.set(ColorMode::Dark);
        assert_eq!(*seen.lock().unwrap(), Some(ColorMode::Dark));
    }
}
