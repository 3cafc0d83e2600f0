//! Error handling module.
//!
//! Storage backends report [`StorageError`]; facade construction and the CLI
//! report [`AppError`]. Change handlers return [`HandlerError`], which is never
//! propagated to the caller of a storage operation.

use config::ConfigError;

use crate::domain::StorageArea;

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Configuration was loaded but is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested storage area is not provided by the host.
    #[error("Storage area '{0}' is unavailable")]
    Unavailable(StorageArea),

    /// Writing would exceed the storage quota.
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// File I/O error.
    #[error("File I/O error: {0}")]
    FileIO(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File lock acquisition failed.
    #[error("Failed to acquire lock: {0}")]
    LockFailed(String),

    /// Error raised by the host platform (e.g. a DOM exception).
    #[error("Platform error: {0}")]
    Platform(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::FileIO(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for StorageError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        use wasm_bindgen::JsCast;

        // https://webidl.spec.whatwg.org/#idl-DOMException-error-names
        if let Some(ex) = value.dyn_ref::<web_sys::DomException>() {
            return match ex.name().as_str() {
                "QuotaExceededError" => Self::QuotaExceeded,
                name => Self::Platform(format!("{name}: {}", ex.message())),
            };
        }
        match value.dyn_ref::<js_sys::Error>() {
            Some(err) => Self::Platform(String::from(err.message())),
            None => Self::Platform(format!("{value:?}")),
        }
    }
}

/// Error returned by a change handler.
pub type HandlerError = Box<dyn std::error::Error + 'static>;

/// Result type returned by change handlers.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `StorageError`.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
