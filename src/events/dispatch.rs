//! Handler invocation and failure reporting.

use std::cell::RefCell;
use std::fmt;

use crate::domain::ChangeEvent;
use crate::error::HandlerError;
use crate::events::registry::{Handler, HandlerId};

/// A handler that returned an error during dispatch.
#[derive(Debug)]
pub struct HandlerFailure {
    handler: HandlerId,
    error: HandlerError,
}

impl HandlerFailure {
    /// The failing handler.
    #[must_use]
    pub const fn handler(&self) -> HandlerId {
        self.handler
    }

    /// The error it returned.
    #[must_use]
    pub fn error(&self) -> &(dyn std::error::Error + 'static) {
        self.error.as_ref()
    }
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler {} failed: {}", self.handler, self.error)
    }
}

/// Receives handler failures.
pub trait ExceptionSink {
    /// Report one failure. Must not panic.
    fn report(&self, failure: &HandlerFailure);
}

/// Logs failures through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ExceptionSink for TracingSink {
    fn report(&self, failure: &HandlerFailure) {
        tracing::error!(
            handler = %failure.handler(),
            error = %failure.error(),
            "Storage change handler failed"
        );
    }
}

/// Keeps a rendered copy of every reported failure.
#[derive(Debug, Default)]
pub struct CollectingSink {
    failures: RefCell<Vec<(HandlerId, String)>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<(HandlerId, String)> {
        self.failures.borrow().clone()
    }

    /// Number of failures reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.borrow().len()
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.borrow().is_empty()
    }
}

impl ExceptionSink for CollectingSink {
    fn report(&self, failure: &HandlerFailure) {
        self.failures
            .borrow_mut()
            .push((failure.handler(), failure.error().to_string()));
    }
}

/// Outcome of one dispatch pass.
#[derive(Debug, Default)]
pub struct DispatchReport {
    invoked: usize,
    failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Number of handlers invoked.
    #[must_use]
    pub const fn invoked(&self) -> usize {
        self.invoked
    }

    /// Failures in invocation order.
    #[must_use]
    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    /// Whether every handler succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Invoke every handler with `event`, in order.
///
/// A failing handler is reported to `sink` immediately and does not stop the
/// pass.
pub fn dispatch(
    handlers: &[(HandlerId, Handler)],
    event: &ChangeEvent,
    sink: &dyn ExceptionSink,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for (id, handler) in handlers {
        report.invoked += 1;
        if let Err(error) = handler(event) {
            let failure = HandlerFailure { handler: *id, error };
            sink.report(&failure);
            report.failures.push(failure);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::StorageArea;
    use crate::error::HandlerResult;
    use crate::events::registry::HandlerRegistry;

    #[test]
    fn test_failure_does_not_stop_later_handlers() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = HandlerRegistry::new();

        let log = Rc::clone(&calls);
        let (failing, _) = registry.add(Rc::new(move |_: &ChangeEvent| -> HandlerResult {
            log.borrow_mut().push("first");
            Err("boom".into())
        }));
        let log = Rc::clone(&calls);
        registry.add(Rc::new(move |_: &ChangeEvent| -> HandlerResult {
            log.borrow_mut().push("second");
            Ok(())
        }));

        let sink = CollectingSink::new();
        let event = ChangeEvent::cleared("about:blank", StorageArea::Local);
        let report = dispatch(&registry.snapshot(), &event, &sink);

        assert_eq!(*calls.borrow(), vec!["first", "second"]);
        assert_eq!(report.invoked(), 2);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].handler(), failing);
        assert_eq!(sink.failures(), vec![(failing, "boom".to_string())]);
    }

    #[test]
    fn test_empty_dispatch_is_clean() {
        let event = ChangeEvent::cleared("about:blank", StorageArea::Session);
        let report = dispatch(&[], &event, &TracingSink);
        assert_eq!(report.invoked(), 0);
        assert!(report.is_clean());
    }
}
