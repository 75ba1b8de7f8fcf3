//! # colormode - light/dark/system theme preference resolution
//!
//! `colormode` decides whether an application should display in light or dark
//! mode. The user picks one of three [`Preference`]s; `System` defers to the
//! operating system, which is observed through a [`SystemSignal`]. The
//! effective [`ColorMode`] is always derived, never stored:
//!
//! | preference | effective mode      |
//! |------------|---------------------|
//! | `Light`    | `Light`             |
//! | `Dark`     | `Dark`              |
//! | `System`   | whatever the OS says |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use colormode::{FileStore, OsSignal, Preference, ThemeResolver};
//!
//! let os = Arc::new(OsSignal::new());
//! let _watch = os.watch(Duration::from_secs(2));
//!
//! let mut builder = ThemeResolver::builder().signal(os);
//! if let Some(store) = FileStore::default_location("my-app") {
//!     builder = builder.store(store);
//! }
//! let resolver = builder.build();
//!
//! let _sub = resolver.subscribe(|mode| {
//!     println!("data-theme={}", mode);
//! });
//!
//! resolver.set_preference(Preference::Dark);
//! ```
//!
//! ## Persistence
//!
//! The preference occupies one key of a [`PreferenceStore`]. Only `"light"`
//! and `"dark"` are written; choosing `System` removes the key, and an absent
//! or unrecognized value reads back as `System`.
//!
//! ## Failure handling
//!
//! A wrong theme is cosmetic, so the resolver never fails: unreadable stores
//! yield `System`, undetectable OS settings yield `Light`, and write errors
//! are logged through `tracing` and otherwise ignored.

mod resolver;
pub mod signal;
pub mod store;
mod sync;
pub mod theme;

pub use resolver::{ThemeResolver, ThemeResolverBuilder};
pub use signal::{
    reset_system_detector, set_system_detector, subscribe_to_system_signal, Detector, Listener,
    ManualSignal, OsSignal, Subscription, SystemSignal, WatchHandle,
};
pub use store::{
    load_preference, save_preference, FileStore, MemoryStore, PreferenceStore, StoreError,
    DEFAULT_KEY,
};
pub use theme::{resolve, Adaptive, ColorMode, ParsePreferenceError, Preference};
