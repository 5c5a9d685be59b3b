use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use common::traits::Notifiable;
use common::types::Callback;

use crate::subscription::Subscription;

pub trait Publishable<T> {
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid;
    fn unregister_listener(&self, listener_id: Uuid);
    fn unregister_all(&self);
    fn notify_listeners(&self, data: Arc<T>);
}

#[derive(Clone, Default)]
pub struct Publisher<T> {
    listeners: Arc<DashMap<Uuid, Callback<T>>>,
}

impl<T> Publisher<T>
where
    T: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
        }
    }

    /// Registers `listener` and returns a handle that unregisters it on `remove()` or drop.
    /// The handle does not keep the publisher alive.
    pub fn subscribe(&self, listener: &mut dyn Notifiable<T>) -> Subscription {
        let id = self.register_listener(listener);
        let listeners = Arc::downgrade(&self.listeners);
        Subscription::new(id, move |id| {
            if let Some(listeners) = listeners.upgrade() {
                listeners.remove(&id);
            }
        })
    }

    // Returns true if no listeners registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    // Returns number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Publishable<T> for Publisher<T>
where
    T: Send + Sync + 'static,
{
    fn register_listener(&self, listener: &mut dyn Notifiable<T>) -> Uuid {
        let callback = listener.get_callback();
        let listener_id = Uuid::new_v4();
        listener.set_id(listener_id);
        self.listeners.insert(listener_id, callback);
        listener_id
    }

    fn unregister_all(&self) {
        self.listeners.clear();
    }

    fn unregister_listener(&self, listener_id: Uuid) {
        self.listeners.remove(&listener_id);
    }

    /// Calls every registered listener in turn, on the caller's thread.
    fn notify_listeners(&self, data: Arc<T>) {
        // Snapshot first so callbacks may (un)register without holding a shard lock.
        let listeners: Vec<(Uuid, Callback<T>)> = self
            .listeners
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (id, callback) in listeners {
            callback(id, data.clone());
        }
    }
}
