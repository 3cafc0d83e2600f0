//! Event strategies.
//!
//! A strategy decides where change events come from. [`NativeEvents`] relies on
//! the host's own notification source and attaches to it lazily;
//! [`EmulatedEvents`] synthesizes the event itself after every mutating call,
//! for hosts whose native event is missing or incomplete.

mod emulated;
mod native;

use std::fmt;
use std::rc::Weak;

use serde::Serialize;

use crate::domain::StorageArea;
use crate::error::StorageResult;
use crate::events::EventHub;
use crate::storage::StorageBackend;

pub use emulated::EmulatedEvents;
pub use native::NativeEvents;

/// Which strategy is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Events come from the host's notification source.
    Native,
    /// Events are synthesized after each mutation.
    Emulated,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Emulated => write!(f, "emulated"),
        }
    }
}

/// The area a mutating call operates on.
pub struct MutationTarget<'a> {
    /// Affected area.
    pub area: StorageArea,
    /// Backend for that area.
    pub backend: &'a dyn StorageBackend,
    /// Hub to dispatch synthesized events through.
    pub hub: &'a EventHub,
}

/// Performs mutating calls and manages the native listener.
pub trait EventStrategy {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Attach the shared native listener. Called on the registry's 0→1
    /// transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the subscription.
    fn attach_listener(&self, hub: Weak<EventHub>) -> StorageResult<()>;

    /// Detach the shared native listener. Called on the registry's 1→0
    /// transition.
    fn detach_listener(&self);

    /// Whether a native listener is currently attached.
    fn is_listening(&self) -> bool;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; no event is dispatched in that case.
    fn set_item(&self, target: &MutationTarget<'_>, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; no event is dispatched in that case.
    fn remove_item(&self, target: &MutationTarget<'_>, key: &str) -> StorageResult<()>;

    /// Remove every entry.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; no event is dispatched in that case.
    fn clear(&self, target: &MutationTarget<'_>) -> StorageResult<()>;
}
