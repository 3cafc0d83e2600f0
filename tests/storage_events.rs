//! Integration tests for the storage facade.
//!
//! These tests drive the public API end to end: area access, emulated and
//! native change events, handler lifecycle, and file-backed persistence.

use std::cell::RefCell;
use std::rc::Rc;

use tempfile::TempDir;

use webstorage_shim::config::{AppConfig, EventMode, StorageBackend};
use webstorage_shim::storage::{FixedLocation, MemoryNotifier, MemoryStorage, NotificationSource};
use webstorage_shim::{
    ChangeEvent, CollectingSink, HandlerResult, StorageArea, StorageError, StorageFacade,
    StrategyKind, create_facade,
};

// ============================================================================
// Test Harness
// ============================================================================

/// Events captured by a recording handler.
type Recorded = Rc<RefCell<Vec<ChangeEvent>>>;

fn recorder() -> (Recorded, impl Fn(&ChangeEvent) -> HandlerResult) {
    let events: Recorded = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    (events, move |event: &ChangeEvent| -> HandlerResult {
        sink.borrow_mut().push(event.clone());
        Ok(())
    })
}

fn emulated_facade() -> StorageFacade {
    StorageFacade::builder()
        .area(StorageArea::Local, MemoryStorage::new())
        .area(StorageArea::Session, MemoryStorage::new())
        .location(Rc::new(FixedLocation::parse("https://app.test/page").unwrap()))
        .build()
        .unwrap()
}

fn native_facade() -> (StorageFacade, Rc<MemoryNotifier>) {
    let notifier = Rc::new(MemoryNotifier::new());
    let facade = StorageFacade::builder()
        .area(StorageArea::Local, MemoryStorage::new())
        .area(StorageArea::Session, MemoryStorage::new())
        .notifier(Rc::clone(&notifier) as Rc<dyn NotificationSource>)
        .build()
        .unwrap();
    (facade, notifier)
}

// ============================================================================
// Area Access Tests
// ============================================================================

#[test]
fn test_areas_are_independent() {
    let facade = emulated_facade();

    facade.set(StorageArea::Local, "a", "1").unwrap();
    facade.set(StorageArea::Session, "a", "2").unwrap();

    assert_eq!(facade.get(StorageArea::Local, "a").as_deref(), Some("1"));
    assert_eq!(facade.get(StorageArea::Session, "a").as_deref(), Some("2"));

    facade.clear(StorageArea::Session).unwrap();
    assert_eq!(facade.length(StorageArea::Session), 0);
    assert_eq!(facade.length(StorageArea::Local), 1);
}

#[test]
fn test_key_enumeration() {
    let facade = emulated_facade();
    for key in ["b", "a", "c"] {
        facade.set(StorageArea::Local, key, key).unwrap();
    }

    let length = facade.length(StorageArea::Local);
    let keys: Vec<String> = (0..length)
        .filter_map(|index| facade.key(StorageArea::Local, i64::try_from(index).unwrap()))
        .collect();
    assert_eq!(keys, vec!["a", "b", "c"]);

    assert_eq!(facade.key(StorageArea::Local, -1), None);
    assert_eq!(facade.key(StorageArea::Local, 3), None);
}

#[test]
fn test_unsupported_area() {
    let facade = StorageFacade::builder()
        .area(StorageArea::Local, MemoryStorage::new())
        .build()
        .unwrap();

    assert!(!facade.is_supported(StorageArea::Session));
    assert!(facade.area(StorageArea::Session).is_none());
    assert_eq!(facade.get(StorageArea::Session, "k"), None);
    assert!(matches!(
        facade.set(StorageArea::Session, "k", "v"),
        Err(StorageError::Unavailable(StorageArea::Session))
    ));
}

// ============================================================================
// Emulated Event Tests
// ============================================================================

#[test]
fn test_emulated_event_sequence() {
    let facade = emulated_facade();
    assert_eq!(facade.strategy_kind(), StrategyKind::Emulated);

    let (events, handler) = recorder();
    let _registration = facade.add_change_handler(handler).unwrap();

    facade.set(StorageArea::Local, "theme", "light").unwrap();
    facade.set(StorageArea::Local, "theme", "dark").unwrap();
    facade.remove(StorageArea::Local, "theme").unwrap();
    facade.clear(StorageArea::Session).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 4);

    assert_eq!(events[0].key(), Some("theme"));
    assert_eq!(events[0].old_value(), None);
    assert_eq!(events[0].new_value(), Some("light"));
    assert_eq!(events[0].url(), "https://app.test/page");

    assert_eq!(events[1].old_value(), Some("light"));
    assert_eq!(events[1].new_value(), Some("dark"));

    assert_eq!(events[2].old_value(), Some("dark"));
    assert_eq!(events[2].new_value(), None);
    assert_eq!(events[2].storage_area(), StorageArea::Local);

    assert!(events[3].is_clear());
    assert_eq!(events[3].storage_area(), StorageArea::Session);
}

#[test]
fn test_removed_handler_stops_receiving() {
    let facade = emulated_facade();
    let (events, handler) = recorder();
    let registration = facade.add_change_handler(handler).unwrap();

    facade.set(StorageArea::Local, "k", "1").unwrap();
    registration.remove();
    registration.remove();
    facade.set(StorageArea::Local, "k", "2").unwrap();

    assert_eq!(events.borrow().len(), 1);
    assert_eq!(facade.handler_count(), 0);
    assert!(!registration.is_active());
}

#[test]
fn test_failing_handler_does_not_stop_dispatch() {
    let sink = Rc::new(CollectingSink::new());
    let facade = StorageFacade::builder()
        .area(StorageArea::Local, MemoryStorage::new())
        .sink(Rc::clone(&sink) as Rc<dyn webstorage_shim::ExceptionSink>)
        .build()
        .unwrap();

    let _failing = facade
        .add_change_handler(|_: &ChangeEvent| -> HandlerResult { Err("handler failed".into()) })
        .unwrap();
    let (events, handler) = recorder();
    let _recording = facade.add_change_handler(handler).unwrap();

    facade.set(StorageArea::Local, "k", "v").unwrap();

    assert_eq!(events.borrow().len(), 1);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.failures()[0].1, "handler failed");
}

// ============================================================================
// Native Event Tests
// ============================================================================

#[test]
fn test_native_listener_follows_handler_count() {
    let (facade, notifier) = native_facade();
    assert_eq!(facade.strategy_kind(), StrategyKind::Native);
    assert!(!notifier.is_attached());

    let (events, handler) = recorder();
    let first = facade.add_change_handler(handler).unwrap();
    let second = facade.add_change_handler(|_: &ChangeEvent| -> HandlerResult { Ok(()) }).unwrap();
    assert!(notifier.is_attached());
    assert!(facade.is_listening());

    let external = ChangeEvent::set("k", None, "v", "https://other.test/", StorageArea::Local);
    assert!(notifier.emit(&external));
    assert_eq!(events.borrow().len(), 1);

    first.remove();
    assert!(notifier.is_attached());
    second.remove();
    assert!(!notifier.is_attached());
    assert!(!notifier.emit(&external));
}

#[test]
fn test_native_mutations_do_not_synthesize() {
    let (facade, _notifier) = native_facade();
    let (events, handler) = recorder();
    let _registration = facade.add_change_handler(handler).unwrap();

    facade.set(StorageArea::Local, "k", "v").unwrap();
    facade.clear(StorageArea::Local).unwrap();

    assert!(events.borrow().is_empty());
}

#[test]
fn test_dropping_facade_detaches_listener() {
    let (facade, notifier) = native_facade();
    let registration = facade
        .add_change_handler(|_: &ChangeEvent| -> HandlerResult { Ok(()) })
        .unwrap();
    assert!(notifier.is_attached());

    drop(facade);
    assert!(!notifier.is_attached());
    assert!(!registration.is_active());
}

#[test]
fn test_facades_sharing_notifier_keep_their_listeners() {
    let notifier = Rc::new(MemoryNotifier::new());
    let build = || {
        StorageFacade::builder()
            .area(StorageArea::Local, MemoryStorage::new())
            .notifier(Rc::clone(&notifier) as Rc<dyn NotificationSource>)
            .build()
            .unwrap()
    };
    let first = build();
    let second = build();

    let (events, handler) = recorder();
    let _recording = first.add_change_handler(handler).unwrap();
    let other = second
        .add_change_handler(|_: &ChangeEvent| -> HandlerResult { Ok(()) })
        .unwrap();
    assert_eq!(notifier.listener_count(), 2);

    let external = ChangeEvent::set("k", None, "v", "https://other.test/", StorageArea::Local);
    notifier.emit(&external);
    assert_eq!(events.borrow().len(), 1);

    other.remove();
    assert!(!second.is_listening());
    assert!(first.is_listening());
    assert_eq!(first.handler_count(), 1);

    notifier.emit(&external);
    assert_eq!(events.borrow().len(), 2);

    drop(first);
    assert!(!notifier.is_attached());
}

// ============================================================================
// Configured Facade Tests
// ============================================================================

#[test]
fn test_file_backend_persists_local_only() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::File;
    config.storage.file.data_dir = temp_dir.path().to_path_buf();

    {
        let facade = create_facade(&config).unwrap();
        facade.set(StorageArea::Local, "user", "ada").unwrap();
        facade.set(StorageArea::Session, "tab", "1").unwrap();
    }

    let facade = create_facade(&config).unwrap();
    assert_eq!(facade.strategy_kind(), StrategyKind::Emulated);
    assert_eq!(facade.get(StorageArea::Local, "user").as_deref(), Some("ada"));
    assert_eq!(facade.get(StorageArea::Session, "tab"), None);
}

#[test]
fn test_native_mode_requires_notifier() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::File;
    config.storage.file.data_dir = temp_dir.path().to_path_buf();
    config.events.mode = EventMode::Native;

    assert!(config.validate().is_err());
    assert!(create_facade(&config).is_err());

    config.storage.backend = StorageBackend::Memory;
    assert!(config.validate().is_err());
    assert!(create_facade(&config).is_err());
}
