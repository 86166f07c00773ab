//! Cursor keys

use core::fmt;
use serde::{Deserialize, Serialize};

/// A key in the cursor's key sequence
///
/// Sequence sources are keyed by [`CursorKey::Index`], mapping sources by
/// [`CursorKey::Name`]. An explicit key list may mix both.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CursorKey {
    /// Integer key (array index)
    Index(usize),
    /// String key (mapping entry name)
    Name(String),
}

impl CursorKey {
    /// Creates a name key
    pub fn name(name: impl Into<String>) -> Self {
        CursorKey::Name(name.into())
    }

    /// Returns the index if this is an integer key
    pub fn as_index(&self) -> Option<usize> {
        match self {
            CursorKey::Index(index) => Some(*index),
            CursorKey::Name(_) => None,
        }
    }

    /// Returns the name if this is a string key
    pub fn as_name(&self) -> Option<&str> {
        match self {
            CursorKey::Index(_) => None,
            CursorKey::Name(name) => Some(name),
        }
    }

    /// Loose (coercing) key comparison.
    ///
    /// Keys of the same kind compare exactly. An index and a name are equal
    /// when the name converts to the same number, e.g. `3 ~ "3"`, `3 ~ " 3 "`,
    /// `16 ~ "0x10"` and `0 ~ ""`.
    pub fn loosely_eq(&self, other: &CursorKey) -> bool {
        match (self, other) {
            (CursorKey::Index(a), CursorKey::Index(b)) => a == b,
            (CursorKey::Name(a), CursorKey::Name(b)) => a == b,
            (CursorKey::Index(index), CursorKey::Name(name))
            | (CursorKey::Name(name), CursorKey::Index(index)) => {
                numeric_value(name) == Some(*index as f64)
            }
        }
    }
}

/// Numeric conversion of a string key, `None` when it is not a number
fn numeric_value(name: &str) -> Option<f64> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).ok().map(|value| value as f64);
    }
    // Rust also accepts "inf"/"nan" spellings; only plain decimals count here
    if trimmed
        .chars()
        .any(|ch| ch.is_ascii_alphabetic() && ch != 'e' && ch != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
}

impl fmt::Display for CursorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorKey::Index(index) => write!(f, "{}", index),
            CursorKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<usize> for CursorKey {
    fn from(index: usize) -> Self {
        CursorKey::Index(index)
    }
}

impl From<&str> for CursorKey {
    fn from(name: &str) -> Self {
        CursorKey::Name(name.into())
    }
}

impl From<String> for CursorKey {
    fn from(name: String) -> Self {
        CursorKey::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_kind_is_exact() {
        assert!(CursorKey::Index(3).loosely_eq(&CursorKey::Index(3)));
        assert!(!CursorKey::Index(3).loosely_eq(&CursorKey::Index(4)));
        assert!(CursorKey::name("a").loosely_eq(&"a".into()));
        assert!(!CursorKey::name("3").loosely_eq(&"03".into()));
    }

    #[test]
    fn test_index_matches_numeric_name() {
        let three = CursorKey::Index(3);
        assert!(three.loosely_eq(&"3".into()));
        assert!(three.loosely_eq(&" 3 ".into()));
        assert!(three.loosely_eq(&"3.0".into()));
        assert!(CursorKey::name("03").loosely_eq(&three));
        assert!(CursorKey::Index(16).loosely_eq(&"0x10".into()));
        assert!(CursorKey::Index(0).loosely_eq(&"".into()));
    }

    #[test]
    fn test_index_rejects_non_numeric_name() {
        let three = CursorKey::Index(3);
        assert!(!three.loosely_eq(&"three".into()));
        assert!(!CursorKey::Index(0).loosely_eq(&"nan".into()));
        assert!(!CursorKey::Index(0).loosely_eq(&"inf".into()));
    }

    #[test]
    fn test_untagged_serde() {
        let keys: Vec<CursorKey> = serde_json::from_str(r#"[0, "b", 7]"#).unwrap();
        assert_eq!(
            keys,
            vec![CursorKey::Index(0), CursorKey::name("b"), CursorKey::Index(7)]
        );
        assert_eq!(serde_json::to_string(&keys).unwrap(), r#"[0,"b",7]"#);
    }

    #[test]
    fn test_display() {
        assert_eq!(CursorKey::Index(12).to_string(), "12");
        assert_eq!(CursorKey::name("abc").to_string(), "abc");
    }
}
