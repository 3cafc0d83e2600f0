//! Storage configuration.

use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;

/// Storage backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-memory storage (tests, embedding).
    #[default]
    Memory,
    /// JSON file storage for the `local` area, in-memory `session` area.
    File,
    /// The browser's native `localStorage` / `sessionStorage`.
    Browser,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
            Self::Browser => write!(f, "browser"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type.
    #[serde(default)]
    pub backend: StorageBackend,

    /// File storage configuration.
    #[serde(default)]
    pub file: FileStorageConfig,

    /// Memory storage configuration.
    #[serde(default)]
    pub memory: MemoryStorageConfig,
}

impl StorageConfig {
    /// Validate the storage configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the selected backend cannot be used on this target
    /// or its required fields are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StorageBackend::Memory => Ok(()),
            StorageBackend::File => {
                if cfg!(target_arch = "wasm32") {
                    return Err(ConfigError::Message(
                        "storage.backend 'file' is not available on wasm32".to_string(),
                    ));
                }
                if self.file.data_dir.as_os_str().is_empty() {
                    return Err(ConfigError::Message(
                        "storage.file.data_dir cannot be empty".to_string(),
                    ));
                }
                Ok(())
            }
            StorageBackend::Browser => {
                if !cfg!(target_arch = "wasm32") {
                    return Err(ConfigError::Message(
                        "storage.backend 'browser' requires a wasm32 target".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileStorageConfig {
    /// Directory for storing area files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Memory storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryStorageConfig {
    /// Per-area quota in bytes (key plus value lengths), 0 for unlimited.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
}

const fn default_quota_bytes() -> usize {
    5 * 1024 * 1024 // 5 MiB, the common browser default
}

impl Default for MemoryStorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: default_quota_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_display() {
        assert_eq!(StorageBackend::Memory.to_string(), "memory");
        assert_eq!(StorageBackend::File.to_string(), "file");
        assert_eq!(StorageBackend::Browser.to_string(), "browser");
    }

    #[test]
    fn test_storage_config_validation() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());

        let mut config = StorageConfig {
            backend: StorageBackend::File,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.file.data_dir = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_browser_backend_rejected_off_wasm() {
        let config = StorageConfig {
            backend: StorageBackend::Browser,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
