//! The theme resolver: preference, OS signal and observers in one place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::signal::{Hub, Listener, OsSignal, Subscription, SystemSignal};
use crate::store::{load_preference, save_preference, MemoryStore, PreferenceStore, DEFAULT_KEY};
use crate::sync::lock;
use crate::theme::{resolve, ColorMode, Preference};

struct Shared {
    preference: Mutex<Preference>,
    // Bumped for every OS change the relay sees, before it gates on the
    // preference.
    os_changes: AtomicU64,
    observers: Hub,
}

/// Tracks the theme preference and publishes the effective color mode.
///
/// Observers registered with [`subscribe`](ThemeResolver::subscribe) receive
/// the newly resolved mode once per change, in order:
///
/// - whenever the preference changes, and
/// - whenever the OS mode changes while the preference is `System`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use colormode::{ColorMode, ManualSignal, Preference, ThemeResolver};
///
/// let os = Arc::new(ManualSignal::new(ColorMode::Dark));
/// let resolver = ThemeResolver::builder().signal(os.clone()).build();
/// assert_eq!(resolver.effective(), ColorMode::Dark);
///
/// resolver.set_preference(Preference::Light);
/// os.set(ColorMode::Light);
/// os.set(ColorMode::Dark);
/// assert_eq!(resolver.effective(), ColorMode::Light);
/// ```
pub struct ThemeResolver {
    store: Box<dyn PreferenceStore>,
    key: String,
    signal: Arc<dyn SystemSignal>,
    shared: Arc<Shared>,
    _signal_subscription: Subscription,
}

impl ThemeResolver {
    /// Creates a builder for configuring a resolver.
    pub fn builder() -> ThemeResolverBuilder {
        ThemeResolverBuilder::new()
    }

    /// Creates a resolver over `store` and `signal` using the default key.
    pub fn new(store: impl PreferenceStore + 'static, signal: Arc<dyn SystemSignal>) -> Self {
        Self::builder().store(store).signal(signal).build()
    }

    fn from_parts(
        store: Box<dyn PreferenceStore>,
        key: String,
        signal: Arc<dyn SystemSignal>,
    ) -> Self {
        let preference = load_preference(&*store, &key);
        debug!(key = %key, %preference, "loaded theme preference");

        let shared = Arc::new(Shared {
            preference: Mutex::new(preference),
            os_changes: AtomicU64::new(0),
            observers: Hub::new(),
        });

        let relay = Arc::clone(&shared);
        let subscription = signal.on_change(Box::new(move |system: ColorMode| {
            relay.os_changes.fetch_add(1, Ordering::SeqCst);
            {
                // Gate on the preference at delivery time.
                let preference = lock(&relay.preference);
                if !preference.follows_system() {
                    return;
                }
                relay.observers.enqueue(system);
            }
            debug!(mode = %system, "effective theme follows OS change");
            relay.observers.drain();
        }));

        Self {
            store,
            key,
            signal,
            shared,
            _signal_subscription: subscription,
        }
    }

    /// The current preference.
    pub fn preference(&self) -> Preference {
        *lock(&self.shared.preference)
    }

    /// The effective color mode, resolved from the live OS signal.
    pub fn effective(&self) -> ColorMode {
        resolve(self.preference(), self.signal.current())
    }

    /// Changes the preference, persists it, and notifies observers if it
    /// differs from the current one.
    ///
    /// Persistence failures are logged and otherwise ignored; the new
    /// preference still takes effect for this resolver.
    ///
    /// Returns the resulting effective mode.
    pub fn set_preference(&self, preference: Preference) -> ColorMode {
        // The OS value is read without holding the preference lock, since a
        // signal may relay a change synchronously from `current()`. An OS
        // change relayed between the read and the lock was gated against the
        // old preference, so read again.
        let (effective, changed) = loop {
            let seen_changes = self.shared.os_changes.load(Ordering::SeqCst);
            let effective = resolve(preference, self.signal.current());
            let mut current = lock(&self.shared.preference);
            if self.shared.os_changes.load(Ordering::SeqCst) != seen_changes {
                continue;
            }
            let changed = *current != preference;
            *current = preference;
            if changed {
                self.shared.observers.enqueue(effective);
            }
            break (effective, changed);
        };

        if let Err(e) = save_preference(&*self.store, &self.key, preference) {
            warn!(key = %self.key, %preference, error = %e, "could not persist theme preference");
        }

        if changed {
            debug!(%preference, %effective, "theme preference changed");
            self.shared.observers.drain();
        }
        effective
    }

    /// Resets the preference to follow the OS.
    pub fn reset(&self) -> ColorMode {
        self.set_preference(Preference::System)
    }

    /// Registers `listener` to receive each new effective mode.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(ColorMode) + Send + 'static,
    {
        let listener: Listener = Box::new(listener);
        self.shared.observers.subscribe(listener)
    }

    /// The storage key the preference lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn signal(&self) -> &Arc<dyn SystemSignal> {
        &self.signal
    }

    pub fn observer_count(&self) -> usize {
        self.shared.observers.listener_count()
    }
}

impl std::fmt::Debug for ThemeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeResolver")
            .field("key", &self.key)
            .field("preference", &self.preference())
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ThemeResolver`].
///
/// By default the preference lives in a [`MemoryStore`] under
/// [`DEFAULT_KEY`], and the OS signal is a fresh [`OsSignal`].
pub struct ThemeResolverBuilder {
    store: Option<Box<dyn PreferenceStore>>,
    signal: Option<Arc<dyn SystemSignal>>,
    key: String,
}

impl ThemeResolverBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            signal: None,
            key: DEFAULT_KEY.to_string(),
        }
    }

    /// Sets where the preference is persisted.
    pub fn store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Sets the OS signal source.
    pub fn signal(mut self, signal: Arc<dyn SystemSignal>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Sets the storage key (default `"theme"`).
    pub fn key(mut self, key: &str) -> Self {
        self.key = key.to_string();
        self
    }

    /// Builds the resolver, loading the persisted preference.
    pub fn build(self) -> ThemeResolver {
        let store = self
            .store
            .unwrap_or_else(|| Box::new(MemoryStore::new()));
        let signal = self
            .signal
            .unwrap_or_else(|| Arc::new(OsSignal::new()));
        ThemeResolver::from_parts(store, self.key, signal)
    }
}

impl Default for ThemeResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{ManualSignal, OsSignal};
    use std::sync::atomic::AtomicBool;

    /// A signal whose OS value changes right after one read of `current()`.
    struct FlipAfterRead {
        inner: ManualSignal,
        flip_to: Mutex<Option<ColorMode>>,
    }

    impl FlipAfterRead {
        fn new(initial: ColorMode) -> Self {
            Self {
                inner: ManualSignal::new(initial),
                flip_to: Mutex::new(None),
            }
        }

        fn flip_on_next_read(&self, mode: ColorMode) {
            *self.flip_to.lock().unwrap() = Some(mode);
        }
    }

    impl SystemSignal for FlipAfterRead {
        fn current(&self) -> ColorMode {
            let seen = self.inner.current();
            let flip = self.flip_to.lock().unwrap().take();
            if let Some(mode) = flip {
                self.inner.set(mode);
            }
            seen
        }

        fn on_change(&self, listener: Listener) -> Subscription {
            self.inner.on_change(listener)
        }
    }

    static RESOLVER_OS_DARK: AtomicBool = AtomicBool::new(false);

    fn resolver_os_detector() -> ColorMode {
        ColorMode::from_dark(RESOLVER_OS_DARK.load(Ordering::SeqCst))
    }

    fn recorder(resolver: &ThemeResolver) -> (Arc<Mutex<Vec<ColorMode>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = resolver.subscribe(move |m| sink.lock().unwrap().push(m));
        (seen, sub)
    }

    fn manual(mode: ColorMode) -> Arc<ManualSignal> {
        Arc::new(ManualSignal::new(mode))
    }

    #[test]
    fn test_loads_persisted_preference() {
        let resolver = ThemeResolver::builder()
            .store(MemoryStore::with_value("theme", "dark"))
            .signal(manual(ColorMode::Light))
            .build();
        assert_eq!(resolver.preference(), Preference::Dark);
        assert_eq!(resolver.effective(), ColorMode::Dark);
    }

    #[test]
    fn test_custom_key() {
        let store = Arc::new(MemoryStore::with_value("ui.theme", "light"));
        let resolver = ThemeResolver::builder()
            .store(Arc::clone(&store))
            .key("ui.theme")
            .signal(manual(ColorMode::Dark))
            .build();
        assert_eq!(resolver.key(), "ui.theme");
        assert_eq!(resolver.effective(), ColorMode::Light);

        resolver.set_preference(Preference::Dark);
        assert_eq!(store.get("ui.theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_set_preference_persists_and_notifies() {
        let store = Arc::new(MemoryStore::new());
        let resolver = ThemeResolver::new(Arc::clone(&store), manual(ColorMode::Dark));
        let (seen, _sub) = recorder(&resolver);

        assert_eq!(resolver.set_preference(Preference::Light), ColorMode::Light);
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("light"));

        assert_eq!(resolver.reset(), ColorMode::Dark);
        assert_eq!(store.get("theme").unwrap(), None);

        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Light, ColorMode::Dark]);
    }

    #[test]
    fn test_same_preference_is_not_a_change() {
        let resolver = ThemeResolver::new(MemoryStore::new(), manual(ColorMode::Light));
        let (seen, _sub) = recorder(&resolver);

        resolver.set_preference(Preference::Dark);
        resolver.set_preference(Preference::Dark);
        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);
    }

    #[test]
    fn test_preference_change_notifies_even_if_mode_unchanged() {
        let resolver = ThemeResolver::new(MemoryStore::new(), manual(ColorMode::Dark));
        let (seen, _sub) = recorder(&resolver);

        // System (dark) -> Dark keeps the effective mode but is still a change.
        resolver.set_preference(Preference::Dark);
        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);
    }

    #[test]
    fn test_os_changes_gated_by_preference() {
        let os = manual(ColorMode::Light);
        let resolver = ThemeResolver::new(MemoryStore::new(), os.clone());
        let (seen, _sub) = recorder(&resolver);

        os.set(ColorMode::Dark);
        resolver.set_preference(Preference::Light);
        os.set(ColorMode::Light);
        os.set(ColorMode::Dark);
        resolver.reset();
        os.set(ColorMode::Light);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ColorMode::Dark,
                ColorMode::Light,
                ColorMode::Dark,
                ColorMode::Light,
            ]
        );
    }

    #[test]
    fn test_unsubscribed_observer_hears_nothing() {
        let os = manual(ColorMode::Light);
        let resolver = ThemeResolver::new(MemoryStore::new(), os.clone());
        let (seen, sub) = recorder(&resolver);

        sub.unsubscribe();
        os.set(ColorMode::Dark);
        resolver.set_preference(Preference::Light);
        sub.unsubscribe();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(resolver.observer_count(), 0);
    }

    #[test]
    fn test_drop_releases_signal_listener() {
        let os = manual(ColorMode::Light);
        let resolver = ThemeResolver::new(MemoryStore::new(), os.clone());
        assert_eq!(os.listener_count(), 1);
        drop(resolver);
        assert_eq!(os.listener_count(), 0);
    }

    #[test]
    fn test_reentrant_set_preference_from_observer() {
        let resolver = Arc::new(ThemeResolver::new(MemoryStore::new(), manual(ColorMode::Light)));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let weak = Arc::downgrade(&resolver);
        let _sub = resolver.subscribe(move |mode| {
            sink.lock().unwrap().push(mode);
            if mode == ColorMode::Dark {
                if let Some(resolver) = weak.upgrade() {
                    resolver.set_preference(Preference::Light);
                }
            }
        });

        resolver.set_preference(Preference::Dark);
        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark, ColorMode::Light]);
        assert_eq!(resolver.preference(), Preference::Light);
    }

    #[test]
    fn test_os_change_during_preference_switch_is_not_lost() {
        let os = Arc::new(FlipAfterRead::new(ColorMode::Light));
        let resolver = ThemeResolver::builder()
            .store(MemoryStore::with_value("theme", "light"))
            .signal(os.clone())
            .build();
        let (seen, _sub) = recorder(&resolver);

        os.flip_on_next_read(ColorMode::Dark);
        let effective = resolver.set_preference(Preference::System);

        assert_eq!(effective, ColorMode::Dark);
        assert_eq!(resolver.effective(), ColorMode::Dark);
        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);
    }

    #[test]
    fn test_polled_os_signal_gated_by_preference() {
        RESOLVER_OS_DARK.store(false, Ordering::SeqCst);
        let os = Arc::new(OsSignal::with_detector(resolver_os_detector));
        let resolver = ThemeResolver::new(MemoryStore::new(), os.clone());
        let (seen, _sub) = recorder(&resolver);
        assert_eq!(resolver.effective(), ColorMode::Light);

        // Following the OS: one flip, one notification.
        RESOLVER_OS_DARK.store(true, Ordering::SeqCst);
        assert_eq!(os.poll(), Some(ColorMode::Dark));
        assert_eq!(os.poll(), None);
        assert_eq!(*seen.lock().unwrap(), vec![ColorMode::Dark]);

        // Explicit preference: OS flips notify nobody.
        resolver.set_preference(Preference::Light);
        RESOLVER_OS_DARK.store(false, Ordering::SeqCst);
        assert_eq!(os.poll(), Some(ColorMode::Light));
        RESOLVER_OS_DARK.store(true, Ordering::SeqCst);
        assert_eq!(os.poll(), Some(ColorMode::Dark));
        assert_eq!(resolver.effective(), ColorMode::Light);

        // Back to system picks up the live value.
        assert_eq!(resolver.reset(), ColorMode::Dark);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![ColorMode::Dark, ColorMode::Light, ColorMode::Dark]
        );
        RESOLVER_OS_DARK.store(false, Ordering::SeqCst);
    }
}
