//! Storage layer module.
//!
//! This module provides trait-based abstraction over the host's key/value
//! stores and change notifications, so the facade works the same against a
//! browser, a file, or memory.

#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod factory;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
pub mod location;
pub mod memory;
pub mod traits;

pub use factory::{Platform, create_platform};
pub use location::FixedLocation;
pub use memory::{MemoryNotifier, MemoryStorage};
pub use traits::{
    DocumentLocation, ListenerToken, NativeListener, NotificationSource, StorageBackend,
};
