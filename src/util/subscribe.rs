use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync + 'static>;

/// Detaches a listener when called. Dropping it without calling keeps the listener attached.
pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

static LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Ordered set of observers sharing one event type.
///
/// Listeners are snapshotted before dispatch so a callback may add or remove listeners
/// without deadlocking.
pub struct Listeners<T> {
    entries: Arc<Mutex<Vec<(u64, Listener<T>)>>>,
}

impl<T: 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = LISTENER_ID.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().unwrap().push((id, Arc::new(listener)));

        let entries = Arc::clone(&self.entries);
        Box::new(move || {
            entries.lock().unwrap().retain(|(entry_id, _)| *entry_id != id);
        })
    }

    pub fn notify(&self, event: &T) {
        let snapshot: Vec<Listener<T>> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}
