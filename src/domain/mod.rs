//! Domain models.
//!
//! Storage area identifiers and the storage change event record.

pub mod area;
pub mod event;

pub use area::StorageArea;
pub use event::ChangeEvent;
