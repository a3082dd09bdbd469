use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a purchase order, e.g. `111-1602829-9424211`.
///
/// Doubles as the receipt's file name, so it must be a single safe path segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    pub fn new(value: impl Into<String>) -> Result<Self, ScrapeError> {
        let value = value.into();
        if Self::is_path_safe(&value) {
            Ok(Self(value))
        } else {
            Err(ScrapeError::InvalidOrderId(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the string can be used as a file name inside the receipts directory
    pub fn is_path_safe(value: &str) -> bool {
        if value.trim().is_empty() || value == "." || value == ".." {
            return false;
        }
        !value.chars().any(|c| c == '/' || c == '\\' || c == '\0')
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for OrderId {
    type Error = ScrapeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Outcome of one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique orders seen across the order history
    pub orders_found: usize,

    /// Orders whose receipt was already on disk
    pub already_saved: usize,

    /// Receipts written during this run
    pub downloaded: Vec<OrderId>,

    /// Orders that would have been fetched (dry runs only)
    pub pending: Vec<OrderId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_amazon_style_ids() {
        for raw in ["111-1602829-9424211", "D01-1234567-7654321"] {
            assert_eq!(OrderId::new(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_unsafe_file_names() {
        for raw in ["", "  ", ".", "..", "../etc/passwd", "a\\b", "a\0b"] {
            assert!(OrderId::new(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let id: OrderId = serde_json::from_str("\"111-2\"").unwrap();
        assert_eq!(id.as_str(), "111-2");
        assert!(serde_json::from_str::<OrderId>("\"a/b\"").is_err());
    }
}
