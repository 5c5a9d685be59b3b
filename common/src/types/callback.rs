use std::sync::Arc;
use uuid::Uuid;

/// Listener callback. Receives the id it was registered with and the published data.
pub type Callback<T> = Arc<dyn Fn(Uuid, Arc<T>) + Send + Sync>;
