//! Storage change event.

use serde::Serialize;

use super::StorageArea;

/// Notification describing a single mutation of a storage area.
///
/// Mirrors the DOM `StorageEvent`: `key` is absent when the whole area was
/// cleared, `new_value` is absent when the entry was removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    event_type: &'static str,
    key: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    url: String,
    storage_area: StorageArea,
}

impl ChangeEvent {
    /// The DOM event type name.
    pub const TYPE: &'static str = "storage";

    /// Build an event from raw parts, as received from a native source.
    #[must_use]
    pub fn new(
        key: Option<String>,
        old_value: Option<String>,
        new_value: Option<String>,
        url: impl Into<String>,
        storage_area: StorageArea,
    ) -> Self {
        Self {
            event_type: Self::TYPE,
            key,
            old_value,
            new_value,
            url: url.into(),
            storage_area,
        }
    }

    /// Event for `key` being set to `new_value`.
    #[must_use]
    pub fn set(
        key: impl Into<String>,
        old_value: Option<String>,
        new_value: impl Into<String>,
        url: impl Into<String>,
        storage_area: StorageArea,
    ) -> Self {
        Self::new(
            Some(key.into()),
            old_value,
            Some(new_value.into()),
            url,
            storage_area,
        )
    }

    /// Event for `key` being removed.
    #[must_use]
    pub fn removed(
        key: impl Into<String>,
        old_value: Option<String>,
        url: impl Into<String>,
        storage_area: StorageArea,
    ) -> Self {
        Self::new(Some(key.into()), old_value, None, url, storage_area)
    }

    /// Event for the whole area being cleared.
    #[must_use]
    pub fn cleared(url: impl Into<String>, storage_area: StorageArea) -> Self {
        Self::new(None, None, None, url, storage_area)
    }

    /// The key being changed, or `None` after a clear.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The value before the change.
    #[must_use]
    pub fn old_value(&self) -> Option<&str> {
        self.old_value.as_deref()
    }

    /// The value after the change, or `None` after a removal.
    #[must_use]
    pub fn new_value(&self) -> Option<&str> {
        self.new_value.as_deref()
    }

    /// Address of the document whose storage changed.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The area that was affected.
    #[must_use]
    pub const fn storage_area(&self) -> StorageArea {
        self.storage_area
    }

    /// Whether this event reports a `clear`.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        self.key.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_has_no_key_or_values() {
        let event = ChangeEvent::cleared("about:blank", StorageArea::Local);
        assert!(event.is_clear());
        assert_eq!(event.key(), None);
        assert_eq!(event.old_value(), None);
        assert_eq!(event.new_value(), None);
        assert_eq!(event.storage_area(), StorageArea::Local);
    }

    #[test]
    fn test_removed_keeps_old_value() {
        let event = ChangeEvent::removed(
            "a",
            Some("1".to_string()),
            "about:blank",
            StorageArea::Session,
        );
        assert_eq!(event.key(), Some("a"));
        assert_eq!(event.old_value(), Some("1"));
        assert_eq!(event.new_value(), None);
    }

    #[test]
    fn test_serialize_camel_case() {
        let event = ChangeEvent::set("a", None, "1", "https://example.com/", StorageArea::Local);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "storage");
        assert_eq!(json["key"], "a");
        assert_eq!(json["oldValue"], serde_json::Value::Null);
        assert_eq!(json["newValue"], "1");
        assert_eq!(json["url"], "https://example.com/");
        assert_eq!(json["storageArea"], "local");
    }
}
