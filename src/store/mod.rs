//! Persistence of the theme preference.
//!
//! The preference occupies a single key in a [`PreferenceStore`]. Only
//! `"light"` and `"dark"` are ever written; `System` is stored as the absence
//! of the key, so "reset to system" and "never chosen" read back the same.
//!
//! - [`MemoryStore`]: process-lifetime store, the default
//! - [`FileStore`]: JSON file in the user's config directory

mod error;
mod file;
mod memory;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::theme::Preference;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// The key the preference is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "theme";

/// A string key-value slot store.
pub trait PreferenceStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        (**self).clear(key)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        (**self).clear(key)
    }
}

/// Reads the persisted preference.
///
/// Never fails: an absent key, an unrecognized value, and an unreadable store
/// all yield [`Preference::System`].
pub fn load_preference<S: PreferenceStore + ?Sized>(store: &S, key: &str) -> Preference {
    match store.get(key) {
        Ok(value) => {
            let preference = Preference::from_stored(value.as_deref());
            if let Some(raw) = value.as_deref() {
                if preference.as_str() != raw {
                    debug!(key, value = raw, "ignoring unrecognized stored preference");
                }
            }
            preference
        }
        Err(e) => {
            warn!(key, error = %e, "could not read theme preference, using system");
            Preference::System
        }
    }
}

/// Persists `preference`.
///
/// `System` clears the key rather than writing a literal.
pub fn save_preference<S: PreferenceStore + ?Sized>(
    store: &S,
    key: &str,
    preference: Preference,
) -> Result<(), StoreError> {
    match preference {
        Preference::System => store.clear(key),
        explicit => store.set(key, explicit.as_str()),
    }
}
