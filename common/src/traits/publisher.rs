use crate::types::Callback;
use uuid::Uuid;

/// Anything that can be registered in a publisher to be told about new data.
pub trait Notifiable<T>: Sync + Send {
    fn get_callback(&self) -> Callback<T>;
    fn set_id(&mut self, id: Uuid);
}
