//! Public storage facade.

use std::rc::Rc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::{ChangeEvent, StorageArea};
use crate::error::{AppError, HandlerResult, StorageError, StorageResult};
use crate::events::{
    DispatchReport, EventHub, ExceptionSink, Handler, RegistrationHandle, TracingSink,
};
use crate::storage::{
    DocumentLocation, FixedLocation, NotificationSource, Platform, StorageBackend, create_platform,
};
use crate::strategy::{EmulatedEvents, EventStrategy, MutationTarget, NativeEvents, StrategyKind};

/// Uniform get/set/remove/clear/enumerate over the `local` and `session`
/// areas, plus storage change handler registration.
pub struct StorageFacade {
    local: Option<Box<dyn StorageBackend>>,
    session: Option<Box<dyn StorageBackend>>,
    hub: Rc<EventHub>,
}

impl StorageFacade {
    /// Start building a facade.
    #[must_use]
    pub fn builder() -> StorageFacadeBuilder {
        StorageFacadeBuilder::default()
    }

    fn backend(&self, area: StorageArea) -> Option<&dyn StorageBackend> {
        match area {
            StorageArea::Local => self.local.as_deref(),
            StorageArea::Session => self.session.as_deref(),
        }
    }

    fn mutate<R>(
        &self,
        area: StorageArea,
        op: impl FnOnce(&dyn EventStrategy, &MutationTarget<'_>) -> StorageResult<R>,
    ) -> StorageResult<R> {
        let backend = self.backend(area).ok_or(StorageError::Unavailable(area))?;
        let target = MutationTarget {
            area,
            backend,
            hub: &self.hub,
        };
        op(self.hub.strategy(), &target)
    }

    /// Whether the host provides `area`.
    #[must_use]
    pub fn is_supported(&self, area: StorageArea) -> bool {
        self.backend(area).is_some()
    }

    /// A view bound to `area`, or `None` if the host does not provide it.
    #[must_use]
    pub fn area(&self, area: StorageArea) -> Option<AreaHandle<'_>> {
        self.is_supported(area).then_some(AreaHandle { facade: self, area })
    }

    /// Get the value stored under `key`.
    ///
    /// An unsupported area reads as empty.
    #[must_use]
    pub fn get(&self, area: StorageArea, key: &str) -> Option<String> {
        self.backend(area)?.get_item(key)
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` for an unsupported area, or the
    /// backend's own error (e.g. quota).
    pub fn set(&self, area: StorageArea, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(area, |strategy, target| strategy.set_item(target, key, value))
    }

    /// Remove `key`; a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` for an unsupported area, or the
    /// backend's own error.
    pub fn remove(&self, area: StorageArea, key: &str) -> StorageResult<()> {
        self.mutate(area, |strategy, target| strategy.remove_item(target, key))
    }

    /// Remove every entry of `area`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` for an unsupported area, or the
    /// backend's own error.
    pub fn clear(&self, area: StorageArea) -> StorageResult<()> {
        self.mutate(area, |strategy, target| strategy.clear(target))
    }

    /// Number of entries in `area`.
    #[must_use]
    pub fn length(&self, area: StorageArea) -> usize {
        self.backend(area).map_or(0, |backend| backend.length())
    }

    /// The key at `index`, or `None` unless `0 <= index < length`.
    ///
    /// The range is checked before the backend is asked.
    #[must_use]
    pub fn key(&self, area: StorageArea, index: i64) -> Option<String> {
        let backend = self.backend(area)?;
        let index = usize::try_from(index)
            .ok()
            .filter(|&i| i < backend.length())?;
        backend.key(index)
    }

    /// Register a storage change handler.
    ///
    /// The first registration attaches the native listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the native listener cannot be attached.
    pub fn add_change_handler<F>(&self, handler: F) -> StorageResult<RegistrationHandle>
    where
        F: Fn(&ChangeEvent) -> HandlerResult + 'static,
    {
        let handler: Handler = Rc::new(handler);
        self.hub.add_handler(handler)
    }

    /// Deliver a raw change notification to the registered handlers.
    pub fn dispatch(&self, event: &ChangeEvent) -> DispatchReport {
        self.hub.dispatch(event)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.hub.handler_count()
    }

    /// Whether the native listener is attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.hub.strategy().is_listening()
    }

    /// The event strategy in use.
    #[must_use]
    pub fn strategy_kind(&self) -> StrategyKind {
        self.hub.strategy().kind()
    }
}

/// Storage operations bound to one area.
#[derive(Clone, Copy)]
pub struct AreaHandle<'a> {
    facade: &'a StorageFacade,
    area: StorageArea,
}

impl AreaHandle<'_> {
    /// The bound area.
    #[must_use]
    pub const fn area(&self) -> StorageArea {
        self.area
    }

    /// See [`StorageFacade::get`].
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.facade.get(self.area, key)
    }

    /// See [`StorageFacade::set`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.facade.set(self.area, key, value)
    }

    /// See [`StorageFacade::remove`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.facade.remove(self.area, key)
    }

    /// See [`StorageFacade::clear`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub fn clear(&self) -> StorageResult<()> {
        self.facade.clear(self.area)
    }

    /// See [`StorageFacade::length`].
    #[must_use]
    pub fn length(&self) -> usize {
        self.facade.length(self.area)
    }

    /// See [`StorageFacade::key`].
    #[must_use]
    pub fn key(&self, index: i64) -> Option<String> {
        self.facade.key(self.area, index)
    }

    /// Whether `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// All keys, in backend order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let Some(backend) = self.facade.backend(self.area) else {
            return Vec::new();
        };
        (0..backend.length()).filter_map(|i| backend.key(i)).collect()
    }

    /// All entries, in backend order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }
}

/// Builder for [`StorageFacade`].
#[derive(Default)]
pub struct StorageFacadeBuilder {
    local: Option<Box<dyn StorageBackend>>,
    session: Option<Box<dyn StorageBackend>>,
    notifier: Option<Rc<dyn NotificationSource>>,
    location: Option<Rc<dyn DocumentLocation>>,
    sink: Option<Rc<dyn ExceptionSink>>,
    strategy: Option<StrategyKind>,
}

impl StorageFacadeBuilder {
    /// Use `backend` for `area`.
    #[must_use]
    pub fn area(mut self, area: StorageArea, backend: impl StorageBackend + 'static) -> Self {
        let backend: Box<dyn StorageBackend> = Box::new(backend);
        match area {
            StorageArea::Local => self.local = Some(backend),
            StorageArea::Session => self.session = Some(backend),
        }
        self
    }

    /// Take backends, notifier and location from `platform`.
    #[must_use]
    pub fn platform(mut self, platform: Platform) -> Self {
        self.local = platform.local;
        self.session = platform.session;
        self.notifier = platform.notifier;
        self.location = Some(platform.location);
        self
    }

    /// Native change notification source.
    #[must_use]
    pub fn notifier(mut self, notifier: Rc<dyn NotificationSource>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Location stamped on synthesized events. Defaults to `about:blank`.
    #[must_use]
    pub fn location(mut self, location: Rc<dyn DocumentLocation>) -> Self {
        self.location = Some(location);
        self
    }

    /// Where handler failures go. Defaults to [`TracingSink`].
    #[must_use]
    pub fn sink(mut self, sink: Rc<dyn ExceptionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Select the event strategy. Defaults to native when a notifier is set,
    /// emulated otherwise.
    #[must_use]
    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = Some(kind);
        self
    }

    /// Build the facade.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidConfig` if the native strategy is selected
    /// without a notification source.
    pub fn build(self) -> Result<StorageFacade, AppError> {
        let kind = self.strategy.unwrap_or(if self.notifier.is_some() {
            StrategyKind::Native
        } else {
            StrategyKind::Emulated
        });

        let strategy: Box<dyn EventStrategy> = match kind {
            StrategyKind::Native => {
                let notifier = self.notifier.ok_or_else(|| {
                    AppError::InvalidConfig(
                        "native events need a notification source".to_string(),
                    )
                })?;
                Box::new(NativeEvents::new(notifier))
            }
            StrategyKind::Emulated => {
                let location = self
                    .location
                    .unwrap_or_else(|| Rc::new(FixedLocation::blank()));
                Box::new(EmulatedEvents::new(location))
            }
        };

        let sink = self.sink.unwrap_or_else(|| Rc::new(TracingSink));

        Ok(StorageFacade {
            local: self.local,
            session: self.session,
            hub: EventHub::new(strategy, sink),
        })
    }
}

/// Create a storage facade based on configuration.
///
/// # Errors
///
/// Returns an error if the platform cannot be created or the configured
/// event mode is not possible with the configured backend.
pub fn create_facade(config: &AppConfig) -> Result<StorageFacade, AppError> {
    let platform = create_platform(config)?;
    let kind = config.events.mode.resolve(config.storage.backend);

    info!(
        backend = %config.storage.backend,
        areas = %platform.describe(),
        strategy = %kind,
        "Storage initialized"
    );

    StorageFacade::builder()
        .platform(platform)
        .strategy(kind)
        .build()
}
