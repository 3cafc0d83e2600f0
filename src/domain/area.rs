//! Storage area identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two key/value stores a document can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Persists beyond the browsing session (`localStorage`).
    Local,
    /// Cleared when the browsing context ends (`sessionStorage`).
    Session,
}

impl StorageArea {
    /// Both areas, local first.
    pub const ALL: [Self; 2] = [Self::Local, Self::Session];

    /// Name of the corresponding property on `window`.
    #[must_use]
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Session => "sessionStorage",
        }
    }

    /// Short lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Session => "session",
        }
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown area name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown storage area: {0}")]
pub struct ParseAreaError(String);

impl FromStr for StorageArea {
    type Err = ParseAreaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" | "localStorage" => Ok(Self::Local),
            "session" | "sessionStorage" => Ok(Self::Session),
            other => Err(ParseAreaError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_display() {
        assert_eq!(StorageArea::Local.to_string(), "local");
        assert_eq!(StorageArea::Session.to_string(), "session");
    }

    #[test]
    fn test_area_parse() {
        assert_eq!("local".parse::<StorageArea>(), Ok(StorageArea::Local));
        assert_eq!(
            "sessionStorage".parse::<StorageArea>(),
            Ok(StorageArea::Session)
        );
        assert!("cookies".parse::<StorageArea>().is_err());
    }

    #[test]
    fn test_native_name() {
        assert_eq!(StorageArea::Local.native_name(), "localStorage");
        assert_eq!(StorageArea::Session.native_name(), "sessionStorage");
    }
}
