//! # Crate publisher
//!
//! ## publisher
//!
//! The `publisher` crate provides a mechanism for registering and notifying listeners
//! of new events of type `T`.
//!
//! Listeners are registered through a [`Publisher`], which hands back either the listener id
//! or a [`Subscription`]. A subscription removes its listener when `remove()` is called or
//! when it is dropped, whichever happens first.
//!
//! ### Example
//!
//! ```
//! use std::sync::Arc;
//! use publisher::{Listener, Publishable, Publisher};
//!
//! let publisher = Publisher::<String>::new();
//!
//! // Register a listener
//! let mut listener = Listener::new(|_id, data: Arc<String>| {
//!     println!("Listener received: {}", data);
//! });
//! let subscription = publisher.subscribe(&mut listener);
//!
//! // Notify all listeners
//! publisher.notify_listeners(Arc::new("Hello, World!".to_string()));
//!
//! // Unregister the listener
//! subscription.remove();
//!
//! // Verify that no listeners are left
//! assert!(publisher.is_empty());
//! ```

pub mod listener;
pub mod macros;
pub mod publisher;
pub mod subscription;

pub use listener::Listener;
pub use publisher::{Publishable, Publisher};
pub use subscription::Subscription;
