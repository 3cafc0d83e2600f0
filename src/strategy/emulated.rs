//! Strategy synthesizing change events after each mutation.

use std::rc::{Rc, Weak};

use crate::domain::ChangeEvent;
use crate::error::StorageResult;
use crate::events::EventHub;
use crate::storage::DocumentLocation;

use super::{EventStrategy, MutationTarget, StrategyKind};

/// Builds and dispatches the change event itself.
///
/// The value read before the mutation becomes `old_value`. No native listener
/// is ever attached.
pub struct EmulatedEvents {
    location: Rc<dyn DocumentLocation>,
}

impl EmulatedEvents {
    /// Create a strategy stamping events with `location`.
    #[must_use]
    pub fn new(location: Rc<dyn DocumentLocation>) -> Self {
        Self { location }
    }

    /// Dispatch the event produced by `build` if anyone is listening.
    fn fire(target: &MutationTarget<'_>, build: impl FnOnce() -> ChangeEvent) {
        if target.hub.has_handlers() {
            target.hub.dispatch(&build());
        }
    }

    /// Value before the mutation, read only when it will be reported.
    fn old_value(target: &MutationTarget<'_>, key: &str) -> Option<String> {
        if target.hub.has_handlers() {
            target.backend.get_item(key)
        } else {
            None
        }
    }
}

impl EventStrategy for EmulatedEvents {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Emulated
    }

    fn attach_listener(&self, _hub: Weak<EventHub>) -> StorageResult<()> {
        Ok(())
    }

    fn detach_listener(&self) {}

    fn is_listening(&self) -> bool {
        false
    }

    fn set_item(&self, target: &MutationTarget<'_>, key: &str, value: &str) -> StorageResult<()> {
        let old_value = Self::old_value(target, key);
        target.backend.set_item(key, value)?;

        Self::fire(target, || {
            ChangeEvent::set(key, old_value, value, self.location.href(), target.area)
        });
        Ok(())
    }

    fn remove_item(&self, target: &MutationTarget<'_>, key: &str) -> StorageResult<()> {
        let old_value = Self::old_value(target, key);
        target.backend.remove_item(key)?;

        Self::fire(target, || {
            ChangeEvent::removed(key, old_value, self.location.href(), target.area)
        });
        Ok(())
    }

    fn clear(&self, target: &MutationTarget<'_>) -> StorageResult<()> {
        target.backend.clear()?;

        // Fires even when the area was already empty.
        Self::fire(target, || {
            ChangeEvent::cleared(self.location.href(), target.area)
        });
        Ok(())
    }
}
