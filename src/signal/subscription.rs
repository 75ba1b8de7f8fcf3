//! Listener registration and ordered delivery.
//!
//! A [`Hub`] owns the listeners of one change source. Events are queued and
//! drained by a single dispatcher at a time, so every listener sees events
//! in the order they were raised, even when a listener raises another event
//! from inside its callback or another thread emits concurrently.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};

use crate::sync::lock;
use crate::theme::ColorMode;

/// Callback invoked with each new color mode.
pub type Listener = Box<dyn FnMut(ColorMode) + Send + 'static>;

struct Slot {
    active: AtomicBool,
    delivering_on: Mutex<Option<ThreadId>>,
    callback: Mutex<Listener>,
}

impl Slot {
    fn deliver(&self, mode: ColorMode) {
        let mut callback = lock(&self.callback);
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        *lock(&self.delivering_on) = Some(thread::current().id());
        (*callback)(mode);
        *lock(&self.delivering_on) = None;
    }

    /// Deactivates the slot. Returns once no delivery can reach the callback.
    fn cancel(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        let reentrant = *lock(&self.delivering_on) == Some(thread::current().id());
        if !reentrant {
            // Wait out a delivery in flight on another thread.
            drop(lock(&self.callback));
        }
    }
}

#[derive(Default)]
struct HubInner {
    slots: Mutex<Vec<Arc<Slot>>>,
    pending: Mutex<VecDeque<ColorMode>>,
    draining: AtomicBool,
}

/// The listener registry of a single change source.
#[derive(Clone, Default)]
pub(crate) struct Hub {
    inner: Arc<HubInner>,
}

struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Hub {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let slot = Arc::new(Slot {
            active: AtomicBool::new(true),
            delivering_on: Mutex::new(None),
            callback: Mutex::new(listener),
        });
        lock(&self.inner.slots).push(Arc::clone(&slot));
        Subscription {
            slot,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        lock(&self.inner.slots).len()
    }

    /// Queues `mode` and delivers everything pending.
    #[cfg(test)]
    pub(crate) fn emit(&self, mode: ColorMode) {
        self.enqueue(mode);
        self.drain();
    }

    /// Queues `mode` without delivering it.
    ///
    /// Callers that must order events against their own state enqueue while
    /// holding that state's lock and call [`Hub::drain`] after releasing it.
    pub(crate) fn enqueue(&self, mode: ColorMode) {
        lock(&self.inner.pending).push_back(mode);
    }

    /// Delivers queued events unless another dispatcher is already active,
    /// in which case that dispatcher picks them up.
    pub(crate) fn drain(&self) {
        let inner = &self.inner;
        loop {
            if inner
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            {
                let _guard = DrainGuard(&inner.draining);
                loop {
                    let next = lock(&inner.pending).pop_front();
                    let Some(mode) = next else { break };
                    let slots = lock(&inner.slots).clone();
                    for slot in slots {
                        slot.deliver(mode);
                    }
                }
            }
            // An event queued between the last pop and the guard release
            // would otherwise sit until the next emit.
            if lock(&inner.pending).is_empty() {
                return;
            }
        }
    }
}

/// A registered listener.
///
/// Call [`unsubscribe`](Subscription::unsubscribe) or drop the subscription
/// to stop notifications. After either returns, the listener is never
/// invoked again.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    slot: Arc<Slot>,
    hub: Weak<HubInner>,
}

impl Subscription {
    /// Stops notifications to this listener.
    ///
    /// Safe to call any number of times; calls after the first do nothing.
    /// If a notification is being delivered to this listener on another
    /// thread, this waits for it to finish.
    pub fn unsubscribe(&self) {
        self.slot.cancel();
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub.slots).retain(|s| !Arc::ptr_eq(s, &self.slot));
        }
    }

    /// Whether this listener still receives notifications.
    pub fn is_active(&self) -> bool {
        self.slot.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
