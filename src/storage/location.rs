//! Document location providers.

use url::Url;

use crate::storage::traits::DocumentLocation;

/// A location fixed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedLocation(String);

impl FixedLocation {
    /// Parse `href` into a fixed location.
    ///
    /// # Errors
    ///
    /// Returns an error if `href` is not an absolute URL.
    pub fn parse(href: &str) -> Result<Self, url::ParseError> {
        Url::parse(href).map(Self::from)
    }

    /// The `about:blank` location.
    #[must_use]
    pub fn blank() -> Self {
        Self("about:blank".to_string())
    }
}

impl From<Url> for FixedLocation {
    fn from(url: Url) -> Self {
        Self(url.into())
    }
}

impl Default for FixedLocation {
    fn default() -> Self {
        Self::blank()
    }
}

impl DocumentLocation for FixedLocation {
    fn href(&self) -> String {
        self.0.clone()
    }
}
