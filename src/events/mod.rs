//! Change handler registration and dispatch.

pub mod dispatch;
pub mod hub;
pub mod registry;

pub use dispatch::{
    CollectingSink, DispatchReport, ExceptionSink, HandlerFailure, TracingSink, dispatch,
};
pub use hub::{EventHub, RegistrationHandle};
pub use registry::{Handler, HandlerId, HandlerRegistry, SizeTransition};
