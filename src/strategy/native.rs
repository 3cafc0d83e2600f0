//! Strategy forwarding the host's own change notifications.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use crate::domain::ChangeEvent;
use crate::error::StorageResult;
use crate::events::EventHub;
use crate::storage::{ListenerToken, NotificationSource};

use super::{EventStrategy, MutationTarget, StrategyKind};

/// Mutations go straight to the backend; events arrive from `source`.
///
/// The source may be shared with other facades. This strategy removes only
/// the listener it installed.
pub struct NativeEvents {
    source: Rc<dyn NotificationSource>,
    token: Cell<Option<ListenerToken>>,
}

impl NativeEvents {
    /// Create a strategy listening on `source`.
    #[must_use]
    pub fn new(source: Rc<dyn NotificationSource>) -> Self {
        Self {
            source,
            token: Cell::new(None),
        }
    }
}

impl EventStrategy for NativeEvents {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Native
    }

    fn attach_listener(&self, hub: Weak<EventHub>) -> StorageResult<()> {
        self.detach_listener();

        // Weak: the source may outlive the facade that owns the hub.
        let token = self.source.attach(Rc::new(move |event: &ChangeEvent| {
            if let Some(hub) = hub.upgrade() {
                hub.dispatch(event);
            }
        }))?;
        self.token.set(Some(token));
        Ok(())
    }

    fn detach_listener(&self) {
        if let Some(token) = self.token.take() {
            self.source.detach(token);
        }
    }

    fn is_listening(&self) -> bool {
        self.token.get().is_some()
    }

    fn set_item(&self, target: &MutationTarget<'_>, key: &str, value: &str) -> StorageResult<()> {
        target.backend.set_item(key, value)
    }

    fn remove_item(&self, target: &MutationTarget<'_>, key: &str) -> StorageResult<()> {
        target.backend.remove_item(key)
    }

    fn clear(&self, target: &MutationTarget<'_>) -> StorageResult<()> {
        target.backend.clear()
    }
}
