//! Change event configuration.

use config::ConfigError;
use serde::Deserialize;

use super::StorageBackend;
use crate::strategy::StrategyKind;

/// How change events are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Native for the browser backend, emulated otherwise.
    #[default]
    Auto,
    /// Forward the host's own change notifications.
    Native,
    /// Synthesize an event after every mutating call.
    Emulated,
}

impl EventMode {
    /// Resolve `Auto` against the configured backend.
    #[must_use]
    pub const fn resolve(self, backend: StorageBackend) -> StrategyKind {
        match (self, backend) {
            (Self::Native, _) | (Self::Auto, StorageBackend::Browser) => StrategyKind::Native,
            (Self::Emulated | Self::Auto, _) => StrategyKind::Emulated,
        }
    }
}

/// Change event configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Event production mode.
    #[serde(default)]
    pub mode: EventMode,

    /// Document URL reported in synthesized events when not running in a
    /// browser window.
    #[serde(default = "default_document_url")]
    pub document_url: String,
}

fn default_document_url() -> String {
    "about:blank".to_string()
}

impl EventsConfig {
    /// Validate the event configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `document_url` is not an absolute URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.document_url).map_err(|e| {
            ConfigError::Message(format!(
                "events.document_url '{}' is invalid: {e}",
                self.document_url
            ))
        })?;
        Ok(())
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            mode: EventMode::default(),
            document_url: default_document_url(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_mode_resolution() {
        assert_eq!(
            EventMode::Auto.resolve(StorageBackend::Browser),
            StrategyKind::Native
        );
        assert_eq!(
            EventMode::Auto.resolve(StorageBackend::File),
            StrategyKind::Emulated
        );
        assert_eq!(
            EventMode::Auto.resolve(StorageBackend::Memory),
            StrategyKind::Emulated
        );
    }

    #[test]
    fn test_explicit_mode_wins() {
        assert_eq!(
            EventMode::Native.resolve(StorageBackend::Memory),
            StrategyKind::Native
        );
        assert_eq!(
            EventMode::Emulated.resolve(StorageBackend::Browser),
            StrategyKind::Emulated
        );
    }

    #[test]
    fn test_document_url_validation() {
        assert!(EventsConfig::default().validate().is_ok());

        let config = EventsConfig {
            document_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
