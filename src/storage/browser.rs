//! Browser storage backend.
//!
//! Wraps `window.localStorage` / `window.sessionStorage` and the window's
//! `storage` event. Only built for `wasm32`.

use std::cell::{Cell, RefCell};

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Storage, StorageEvent, Window};

use crate::domain::{ChangeEvent, StorageArea};
use crate::error::{StorageError, StorageResult};
use crate::storage::traits::{
    DocumentLocation, ListenerToken, NativeListener, NotificationSource, StorageBackend,
};

const STORAGE_EVENT: &str = "storage";

fn window() -> Option<Window> {
    web_sys::window()
}

fn native_storage(window: &Window, area: StorageArea) -> Option<Storage> {
    let storage = match area {
        StorageArea::Local => window.local_storage(),
        StorageArea::Session => window.session_storage(),
    };
    // Access can throw (e.g. SecurityError for opaque origins).
    storage.ok().flatten()
}

/// Storage backed by a native `Storage` object.
pub struct BrowserStorage {
    area: StorageArea,
    storage: Storage,
}

impl BrowserStorage {
    /// Open the native storage object for `area`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if there is no window or the area is
    /// disabled in this context.
    pub fn open(area: StorageArea) -> StorageResult<Self> {
        let storage = window()
            .and_then(|w| native_storage(&w, area))
            .ok_or(StorageError::Unavailable(area))?;
        Ok(Self { area, storage })
    }
}

impl StorageBackend for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).unwrap_or_else(|e| {
            tracing::warn!(area = %self.area, key, error = ?e, "getItem failed");
            None
        })
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(StorageError::from)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.storage.remove_item(key).map_err(StorageError::from)
    }

    fn clear(&self) -> StorageResult<()> {
        self.storage.clear().map_err(StorageError::from)
    }

    fn length(&self) -> usize {
        self.storage
            .length()
            .map_or(0, |len| usize::try_from(len).unwrap_or(usize::MAX))
    }

    fn key(&self, index: usize) -> Option<String> {
        let index = u32::try_from(index).ok()?;
        self.storage.key(index).ok().flatten()
    }

    fn backend_name(&self) -> &'static str {
        "browser"
    }
}

type StorageClosure = Closure<dyn FnMut(StorageEvent)>;

/// The window's `storage` event as a notification source.
///
/// Every attached listener is registered on the window with its own closure.
pub struct WindowNotifier {
    window: Window,
    local: Option<Storage>,
    closures: RefCell<Vec<(ListenerToken, StorageClosure)>>,
    next_token: Cell<u64>,
}

impl WindowNotifier {
    /// Bind to the current window.
    ///
    /// # Errors
    ///
    /// Returns an error outside a window context (e.g. in a worker).
    pub fn new() -> StorageResult<Self> {
        let window = window().ok_or(StorageError::Unavailable(StorageArea::Local))?;
        let local = native_storage(&window, StorageArea::Local);
        Ok(Self {
            window,
            local,
            closures: RefCell::new(Vec::new()),
            next_token: Cell::new(0),
        })
    }

    fn remove_listener(&self, closure: &StorageClosure) {
        let callback: &js_sys::Function = closure.as_ref().unchecked_ref();
        if let Err(e) = self.window.remove_event_listener_with_callback(STORAGE_EVENT, callback) {
            tracing::warn!(error = ?e, "removeEventListener failed");
        }
    }
}

impl NotificationSource for WindowNotifier {
    fn attach(&self, listener: NativeListener) -> StorageResult<ListenerToken> {
        let local = self.local.clone();
        let closure = StorageClosure::new(move |event: StorageEvent| {
            // Anything that is not our localStorage object is sessionStorage.
            let area = match (event.storage_area(), local.as_ref()) {
                (Some(affected), Some(local)) if &affected == local => StorageArea::Local,
                _ => StorageArea::Session,
            };
            let change = ChangeEvent::new(
                event.key(),
                event.old_value(),
                event.new_value(),
                event.url(),
                area,
            );
            listener(&change);
        });

        self.window
            .add_event_listener_with_callback(STORAGE_EVENT, closure.as_ref().unchecked_ref())?;

        let token = ListenerToken::new(self.next_token.get());
        self.next_token.set(self.next_token.get() + 1);
        self.closures.borrow_mut().push((token, closure));
        Ok(token)
    }

    fn detach(&self, token: ListenerToken) {
        let removed = {
            let mut closures = self.closures.borrow_mut();
            closures
                .iter()
                .position(|(t, _)| *t == token)
                .map(|index| closures.remove(index).1)
        };
        if let Some(closure) = removed {
            self.remove_listener(&closure);
        }
    }

    fn listener_count(&self) -> usize {
        self.closures.borrow().len()
    }
}

impl Drop for WindowNotifier {
    fn drop(&mut self) {
        // The window must not call into a freed closure.
        let closures = std::mem::take(self.closures.get_mut());
        for (_, closure) in &closures {
            self.remove_listener(&closure);
        }
    }
}

/// `window.location.href`, read on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowLocation;

impl DocumentLocation for WindowLocation {
    fn href(&self) -> String {
        window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_item_operations() {
        let storage = BrowserStorage::open(StorageArea::Session).unwrap();
        storage.clear().unwrap();

        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").as_deref(), Some("1"));
        assert_eq!(storage.length(), 2);
        assert_eq!(storage.key(5), None);

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a"), None);
        storage.clear().unwrap();
        assert_eq!(storage.length(), 0);
    }

    #[wasm_bindgen_test]
    fn test_window_notifier_attach_detach() {
        let notifier = WindowNotifier::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let first = notifier
            .attach(Rc::new(move |_: &ChangeEvent| counter.set(counter.get() + 1)))
            .unwrap();
        let second = notifier.attach(Rc::new(|_: &ChangeEvent| {})).unwrap();
        assert_eq!(notifier.listener_count(), 2);

        notifier.detach(second);
        assert_eq!(notifier.listener_count(), 1);
        notifier.detach(first);
        assert!(!notifier.is_attached());
        assert_eq!(calls.get(), 0);
    }

    #[wasm_bindgen_test]
    fn test_window_location() {
        assert!(!WindowLocation.href().is_empty());
    }
}
