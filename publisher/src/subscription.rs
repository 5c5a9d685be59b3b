use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Handle to a registered listener.
///
/// The listener stays registered until [`Subscription::remove`] is called or the
/// handle is dropped. Removal is idempotent.
pub struct Subscription {
    id: Uuid,
    active: AtomicBool,
    release: Box<dyn Fn(Uuid) + Send + Sync>,
}

impl Subscription {
    pub fn new<F>(id: Uuid, release: F) -> Self
    where
        F: Fn(Uuid) + Send + Sync + 'static,
    {
        Self {
            id,
            active: AtomicBool::new(true),
            release: Box::new(release),
        }
    }

    pub fn get_id(&self) -> Uuid {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Unregisters the listener. Calling it more than once has no further effect.
    pub fn remove(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            log::debug!("Removing listener {}", self.id);
            (self.release)(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
