//! Session change notifications.
//!
//! An explicit observable handed to whatever renders session-dependent UI,
//! instead of a process-wide named event. Listeners run synchronously, in
//! registration order, on the thread that changed the session.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::RwLock;

use super::SessionUser;

/// Name of the DOM event the browser bridge dispatches on every change.
pub const SESSION_UPDATED_EVENT: &str = "session-user:updated";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    Persisted(SessionUser),
    Cleared,
}

type Listener = Arc<dyn Fn(&SessionChange) + Send + Sync>;

/// Handle returned by [`SessionObservers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
struct Inner {
    listeners: RwLock<Vec<(Subscription, Listener)>>,
    next_id: AtomicU64,
    notifications: AtomicU64,
}

/// Registry of session listeners. Clones share the same registry.
#[derive(Clone, Default)]
pub struct SessionObservers {
    inner: Arc<Inner>,
}

impl SessionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        let id = Subscription(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Returns false when the subscription was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    /// Invoke every listener with `change`.
    ///
    /// The listener list is snapshotted first, so a listener may subscribe,
    /// unsubscribe or read the session without deadlocking.
    pub fn notify(&self, change: &SessionChange) {
        let snapshot: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        self.inner.notifications.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(
            listeners = snapshot.len(),
            event = SESSION_UPDATED_EVENT,
            "Notifying session listeners"
        );
        for listener in snapshot {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Total notifications sent since creation.
    pub fn notification_count(&self) -> u64 {
        self.inner.notifications.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for SessionObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionObservers")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let observers = SessionObservers::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            observers.subscribe(move |_| log.lock().push(name));
        }

        observers.notify(&SessionChange::Cleared);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
        assert_eq!(observers.notification_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let observers = SessionObservers::new();
        let hits = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&hits);
        let sub = observers.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        observers.notify(&SessionChange::Cleared);
        assert!(observers.unsubscribe(sub));
        assert!(!observers.unsubscribe(sub));
        observers.notify(&SessionChange::Cleared);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(observers.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_unsubscribe_itself() {
        let observers = SessionObservers::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let handle = observers.clone();
        let own = Arc::clone(&slot);
        let sub = observers.subscribe(move |_| {
            if let Some(sub) = *own.lock() {
                handle.unsubscribe(sub);
            }
        });
        *slot.lock() = Some(sub);

        observers.notify(&SessionChange::Cleared);
        assert_eq!(observers.listener_count(), 0);
    }

    #[test]
    fn test_clones_share_registry() {
        let observers = SessionObservers::new();
        let clone = observers.clone();
        clone.subscribe(|_| {});
        assert_eq!(observers.listener_count(), 1);
    }
}
