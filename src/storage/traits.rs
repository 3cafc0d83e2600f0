//! Storage trait definitions.
//!
//! These traits describe the host platform contract: a key/value store per
//! area, a source of native change notifications, and the document location.
//! All of them are single-threaded; implementations may hold `!Send` handles
//! such as `web_sys` objects.

use std::rc::Rc;

use crate::domain::ChangeEvent;
use crate::error::StorageResult;

/// Key/value store backing one storage area.
///
/// Reads are infallible: a backend that cannot read reports the entry as
/// absent. Writes surface the platform's own failure (e.g. quota).
pub trait StorageBackend {
    /// Get the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key` if present.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Remove every entry.
    fn clear(&self) -> StorageResult<()>;

    /// Number of entries.
    fn length(&self) -> usize;

    /// Key at ordinal `index`.
    ///
    /// Callers only pass `index < length()`; backends need not guard it.
    fn key(&self, index: usize) -> Option<String>;

    /// Get the storage backend name.
    fn backend_name(&self) -> &'static str;
}

/// Callback installed on a [`NotificationSource`].
pub type NativeListener = Rc<dyn Fn(&ChangeEvent)>;

/// Identifies one listener installed on a [`NotificationSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

impl ListenerToken {
    /// Wrap a source-assigned id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Source of native storage change notifications.
///
/// May be shared by several facades; each installs its own listener and
/// removes only that one.
pub trait NotificationSource {
    /// Install `listener` alongside any already installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the subscription.
    fn attach(&self, listener: NativeListener) -> StorageResult<ListenerToken>;

    /// Remove the listener installed under `token`. Unknown tokens are ignored.
    fn detach(&self, token: ListenerToken);

    /// Number of installed listeners.
    fn listener_count(&self) -> usize;

    /// Whether any listener is installed.
    fn is_attached(&self) -> bool {
        self.listener_count() > 0
    }
}

/// Provides the address of the current document.
pub trait DocumentLocation {
    /// The full URL of the document.
    fn href(&self) -> String;
}
