//! Change listeners
//!
//! Listeners take no arguments: after a broadcast they re-read whatever
//! state they care about through the store's accessors.
//!
//! Broadcast copies the listener list before invoking anything, so a
//! listener may subscribe or unsubscribe (itself included) without
//! affecting the broadcast in progress.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A change callback
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identity of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Ordered set of listeners
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriberId, Listener)>>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    ///
    /// Registering the same callback twice yields two independent
    /// registrations, each invoked on every broadcast.
    pub fn subscribe(self: &Arc<Self>, listener: Listener) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Remove a registration; false if it was already gone
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Invoke every listener in registration order
    pub fn broadcast(&self) {
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in snapshot {
            listener();
        }
    }

    /// Number of registrations
    pub fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.lock().is_empty()
    }
}

impl fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<SubscriberRegistry>,
}

impl Subscription {
    /// Identity of this registration
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Remove this registration
    ///
    /// Returns false if the registry is gone or the registration was
    /// already removed.
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.unsubscribe(self.id),
            None => false,
        }
    }
}
