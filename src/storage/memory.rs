//! In-memory storage backend and notification source.
//!
//! Suitable for tests, for the `session` area of non-browser hosts, and for
//! embedding the facade where no persistent store exists.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::ChangeEvent;
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::{ListenerToken, NativeListener, NotificationSource, StorageBackend};

/// In-memory key/value store.
///
/// Keys enumerate in lexicographic order. An optional quota bounds the sum of
/// key and value lengths in bytes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `quota` bytes.
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: RefCell::default(),
            quota: Some(quota),
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.borrow_mut();

        if let Some(quota) = self.quota {
            let used: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            if used - replaced + key.len() + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.entries.borrow_mut().clear();
        Ok(())
    }

    fn length(&self) -> usize {
        self.entries.borrow().len()
    }

    fn key(&self, index: usize) -> Option<String> {
        self.entries.borrow().keys().nth(index).cloned()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Notification source driven from Rust code.
///
/// Stands in for the browser's `storage` event outside a browser: whoever
/// plays the part of another document calls [`MemoryNotifier::emit`]. Nothing
/// emits on it by itself.
#[derive(Default)]
pub struct MemoryNotifier {
    listeners: RefCell<Vec<(ListenerToken, NativeListener)>>,
    next_token: Cell<u64>,
}

impl MemoryNotifier {
    /// Create a notifier with no listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every installed listener, in attach order.
    ///
    /// Returns `false` when no listener is attached.
    pub fn emit(&self, event: &ChangeEvent) -> bool {
        // Snapshot so a listener may attach or detach from inside the callback.
        let listeners: Vec<NativeListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &listeners {
            listener(event);
        }
        !listeners.is_empty()
    }
}

impl NotificationSource for MemoryNotifier {
    fn attach(&self, listener: NativeListener) -> StorageResult<ListenerToken> {
        let token = ListenerToken::new(self.next_token.get());
        self.next_token.set(self.next_token.get() + 1);
        self.listeners.borrow_mut().push((token, listener));
        Ok(token)
    }

    fn detach(&self, token: ListenerToken) {
        self.listeners.borrow_mut().retain(|(t, _)| *t != token);
    }

    fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}
