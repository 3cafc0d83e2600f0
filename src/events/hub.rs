//! Event hub: registry ownership, listener lifecycle and dispatch.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::domain::ChangeEvent;
use crate::error::StorageResult;
use crate::events::dispatch::{DispatchReport, ExceptionSink, dispatch};
use crate::events::registry::{Handler, HandlerId, HandlerRegistry, SizeTransition};
use crate::strategy::EventStrategy;

/// Owns the handler registry and drives the native listener attachment.
///
/// The listener is attached when the registry goes from zero to one handler
/// and detached when it goes back to zero.
pub struct EventHub {
    registry: RefCell<HandlerRegistry>,
    strategy: Box<dyn EventStrategy>,
    sink: Rc<dyn ExceptionSink>,
}

impl EventHub {
    /// Create a hub using `strategy` and reporting failures to `sink`.
    #[must_use]
    pub fn new(strategy: Box<dyn EventStrategy>, sink: Rc<dyn ExceptionSink>) -> Rc<Self> {
        Rc::new(Self {
            registry: RefCell::new(HandlerRegistry::new()),
            strategy,
            sink,
        })
    }

    /// The active event strategy.
    #[must_use]
    pub fn strategy(&self) -> &dyn EventStrategy {
        self.strategy.as_ref()
    }

    /// Register `handler`, attaching the native listener if it is the first.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be attached; the handler is not
    /// registered in that case.
    pub fn add_handler(self: &Rc<Self>, handler: Handler) -> StorageResult<RegistrationHandle> {
        let (id, transition) = self.registry.borrow_mut().add(handler);

        if transition == SizeTransition::Activated {
            if let Err(e) = self.strategy.attach_listener(Rc::downgrade(self)) {
                self.registry.borrow_mut().remove(id);
                return Err(e);
            }
            debug!(strategy = %self.strategy.kind(), "Storage listener attached");
        }

        debug!(handler = %id, "Storage change handler registered");
        Ok(RegistrationHandle {
            id,
            hub: Rc::downgrade(self),
        })
    }

    /// Deregister `id`, detaching the native listener if it was the last.
    ///
    /// Returns `false` if `id` was not registered.
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        // Bind first so the registry borrow ends before detaching.
        let transition = self.registry.borrow_mut().remove(id);

        match transition {
            None => false,
            Some(SizeTransition::Deactivated) => {
                self.strategy.detach_listener();
                debug!(handler = %id, "Last storage change handler removed, listener detached");
                true
            }
            Some(_) => {
                debug!(handler = %id, "Storage change handler removed");
                true
            }
        }
    }

    /// Whether at least one handler is registered.
    #[must_use]
    pub fn has_handlers(&self) -> bool {
        !self.registry.borrow().is_empty()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Whether `id` is still registered.
    #[must_use]
    pub fn is_registered(&self, id: HandlerId) -> bool {
        self.registry.borrow().contains(id)
    }

    /// Deliver `event` to every registered handler in registration order.
    ///
    /// Handlers run on a snapshot of the registry, so a handler added during
    /// dispatch does not see the in-flight event.
    pub fn dispatch(&self, event: &ChangeEvent) -> DispatchReport {
        if !self.has_handlers() {
            return DispatchReport::default();
        }

        let handlers = self.registry.borrow().snapshot();
        let report = dispatch(&handlers, event, self.sink.as_ref());

        debug!(
            area = %event.storage_area(),
            key = event.key(),
            invoked = report.invoked(),
            failed = report.failures().len(),
            "Storage change dispatched"
        );
        report
    }
}

impl Drop for EventHub {
    fn drop(&mut self) {
        if !self.registry.get_mut().is_empty() {
            self.strategy.detach_listener();
        }
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("registry", &self.registry)
            .field("strategy", &self.strategy.kind())
            .finish_non_exhaustive()
    }
}

/// Revocable registration of one change handler.
///
/// Dropping the handle leaves the handler registered.
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    id: HandlerId,
    hub: Weak<EventHub>,
}

impl RegistrationHandle {
    /// The registration id.
    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    /// Deregister the handler. Calling this again has no effect.
    pub fn remove(&self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove_handler(self.id);
        }
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.hub.upgrade().is_some_and(|hub| hub.is_registered(self.id))
    }
}
