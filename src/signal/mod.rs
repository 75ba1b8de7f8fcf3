//! The operating system's dark-mode signal.
//!
//! A [`SystemSignal`] reports whether the OS is currently in dark mode and
//! notifies listeners when that changes. Two sources are provided:
//!
//! - [`OsSignal`]: detects the real OS setting via `dark-light`
//! - [`ManualSignal`]: driven by the host application (or a test)
//!
//! Each listener gets its own [`Subscription`]; there is no shared registry
//! across sources.

mod manual;
mod os;
mod subscription;

pub use manual::ManualSignal;
pub use os::{reset_system_detector, set_system_detector, Detector, OsSignal, WatchHandle};
pub use subscription::{Listener, Subscription};

pub(crate) use subscription::Hub;

use crate::theme::ColorMode;

/// A live source of the OS color mode.
pub trait SystemSignal: Send + Sync {
    /// The OS color mode right now. `Light` if it cannot be determined.
    fn current(&self) -> ColorMode;

    /// Registers `listener` to receive each new OS color mode.
    fn on_change(&self, listener: Listener) -> Subscription;
}

/// Subscribes `on_change` to `signal`.
///
/// Convenience over [`SystemSignal::on_change`] that boxes the closure.
///
/// # Example
///
/// ```rust
/// use colormode::{subscribe_to_system_signal, ColorMode, ManualSignal};
///
/// let signal = ManualSignal::new(ColorMode::Light);
/// let sub = subscribe_to_system_signal(&signal, |mode| println!("OS is now {mode}"));
/// signal.set(ColorMode::Dark);
/// sub.unsubscribe();
/// ```
pub fn subscribe_to_system_signal<S, F>(signal: &S, on_change: F) -> Subscription
where
    S: SystemSignal + ?Sized,
    F: FnMut(ColorMode) + Send + 'static,
{
    signal.on_change(Box::new(on_change))
}
