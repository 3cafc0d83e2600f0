//! Storage backend factory.
//!
//! Creates the per-area backends, notification source and document location
//! based on configuration.

use std::rc::Rc;

use crate::config::{AppConfig, StorageBackend, StorageConfig};
use crate::domain::StorageArea;
use crate::error::AppError;
use crate::storage::location::FixedLocation;
use crate::storage::memory::MemoryStorage;
use crate::storage::traits::{DocumentLocation, NotificationSource, StorageBackend as Backend};

/// Host collaborators the facade is built from.
pub struct Platform {
    /// Backend for `localStorage`, if supported.
    pub local: Option<Box<dyn Backend>>,
    /// Backend for `sessionStorage`, if supported.
    pub session: Option<Box<dyn Backend>>,
    /// Native change notification source, if the host has one.
    pub notifier: Option<Rc<dyn NotificationSource>>,
    /// Location stamped on synthesized events.
    pub location: Rc<dyn DocumentLocation>,
}

impl Platform {
    /// Names of the configured backends, for logging.
    #[must_use]
    pub fn describe(&self) -> String {
        StorageArea::ALL
            .iter()
            .map(|&area| {
                let backend = match area {
                    StorageArea::Local => self.local.as_deref(),
                    StorageArea::Session => self.session.as_deref(),
                };
                format!("{area}={}", backend.map_or("unsupported", |b| b.backend_name()))
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Create the host platform based on configuration.
///
/// # Errors
///
/// Returns an error if the backend is unavailable on this target, the document
/// URL is invalid, or the file backend cannot create its directory.
pub fn create_platform(config: &AppConfig) -> Result<Platform, AppError> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(memory_platform(&config.storage, fixed_location(config)?)),
        StorageBackend::File => file_platform(config),
        StorageBackend::Browser => browser_platform(),
    }
}

fn fixed_location(config: &AppConfig) -> Result<Rc<dyn DocumentLocation>, AppError> {
    let location = FixedLocation::parse(&config.events.document_url).map_err(|e| {
        AppError::InvalidConfig(format!(
            "events.document_url '{}': {e}",
            config.events.document_url
        ))
    })?;
    Ok(Rc::new(location))
}

fn memory_area(config: &StorageConfig) -> Box<dyn Backend> {
    match config.memory.quota_bytes {
        0 => Box::new(MemoryStorage::new()),
        quota => Box::new(MemoryStorage::with_quota(quota)),
    }
}

fn memory_platform(config: &StorageConfig, location: Rc<dyn DocumentLocation>) -> Platform {
    Platform {
        local: Some(memory_area(config)),
        session: Some(memory_area(config)),
        // Only a browser notifies; embedders wanting native events pass a
        // `MemoryNotifier` to the builder themselves.
        notifier: None,
        location,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn file_platform(config: &AppConfig) -> Result<Platform, AppError> {
    use crate::storage::file::FileStorage;

    let local = FileStorage::new(&config.storage.file, StorageArea::Local)?;

    Ok(Platform {
        local: Some(Box::new(local)),
        // Session data must not outlive the process.
        session: Some(memory_area(&config.storage)),
        notifier: None,
        location: fixed_location(config)?,
    })
}

#[cfg(target_arch = "wasm32")]
fn file_platform(_config: &AppConfig) -> Result<Platform, AppError> {
    Err(AppError::InvalidConfig(
        "storage.backend 'file' is not available on wasm32".to_string(),
    ))
}

#[cfg(target_arch = "wasm32")]
fn browser_platform() -> Result<Platform, AppError> {
    use crate::storage::browser::{BrowserStorage, WindowLocation, WindowNotifier};

    let open = |area| -> Option<Box<dyn Backend>> {
        match BrowserStorage::open(area) {
            Ok(storage) => Some(Box::new(storage)),
            Err(e) => {
                tracing::warn!(%area, error = %e, "Storage area not supported");
                None
            }
        }
    };

    Ok(Platform {
        local: open(StorageArea::Local),
        session: open(StorageArea::Session),
        notifier: WindowNotifier::new()
            .ok()
            .map(|n| Rc::new(n) as Rc<dyn NotificationSource>),
        location: Rc::new(WindowLocation),
    })
}

#[cfg(not(target_arch = "wasm32"))]
fn browser_platform() -> Result<Platform, AppError> {
    Err(AppError::InvalidConfig(
        "storage.backend 'browser' requires a wasm32 target".to_string(),
    ))
}
