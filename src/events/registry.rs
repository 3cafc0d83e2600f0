//! Ordered registry of change handlers.

use std::fmt;
use std::rc::Rc;

use crate::domain::ChangeEvent;
use crate::error::HandlerResult;

/// A registered change handler.
pub type Handler = Rc<dyn Fn(&ChangeEvent) -> HandlerResult>;

/// Identifies one registration within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Raw numeric id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Effect of a registration change on the registry's emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeTransition {
    /// The registry went from empty to one handler.
    Activated,
    /// The registry went from one handler to empty.
    Deactivated,
    /// Emptiness did not change.
    Unchanged,
}

/// Handlers in registration order.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<(HandlerId, Handler)>,
    next_id: u64,
}

impl HandlerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler`.
    pub fn add(&mut self, handler: Handler) -> (HandlerId, SizeTransition) {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));

        let transition = if self.handlers.len() == 1 {
            SizeTransition::Activated
        } else {
            SizeTransition::Unchanged
        };
        (id, transition)
    }

    /// Remove the handler registered as `id`.
    ///
    /// Returns `None` if `id` is not (or no longer) registered.
    pub fn remove(&mut self, id: HandlerId) -> Option<SizeTransition> {
        let position = self.handlers.iter().position(|(h, _)| *h == id)?;
        self.handlers.remove(position);

        Some(if self.handlers.is_empty() {
            SizeTransition::Deactivated
        } else {
            SizeTransition::Unchanged
        })
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: HandlerId) -> bool {
        self.handlers.iter().any(|(h, _)| *h == id)
    }

    /// Copy of the current handlers, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(HandlerId, Handler)> {
        self.handlers.clone()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .field("next_id", &self.next_id)
            .finish()
    }
}
