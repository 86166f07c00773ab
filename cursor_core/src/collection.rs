//! Source collections

use crate::key::CursorKey;

/// Largest canonical array index name (2^32 - 2)
const MAX_INDEX_NAME: u64 = u32::MAX as u64 - 1;

/// The collection a cursor walks over
///
/// Read-only from the cursor's point of view. A sequence may be sparse: `None`
/// slots are holes that natural key enumeration skips.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection<V> {
    /// Array-like collection keyed by index
    Sequence(Vec<Option<V>>),
    /// Object-like collection keyed by name, in insertion order
    Mapping(Vec<(String, V)>),
}

impl<V> Collection<V> {
    /// Creates an empty sequence
    pub fn new() -> Self {
        Collection::Sequence(Vec::new())
    }

    /// Creates a dense sequence
    pub fn from_vec(values: Vec<V>) -> Self {
        Collection::Sequence(values.into_iter().map(Some).collect())
    }

    /// Creates a sparse sequence
    pub fn sparse(slots: Vec<Option<V>>) -> Self {
        Collection::Sequence(slots)
    }

    /// Creates a mapping from entries.
    ///
    /// A repeated name replaces the earlier value but keeps its original slot.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut mapping: Vec<(String, V)> = Vec::new();
        for (name, value) in entries {
            let name = name.into();
            match mapping.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = value,
                None => mapping.push((name, value)),
            }
        }
        Collection::Mapping(mapping)
    }

    /// Number of defined entries
    pub fn len(&self) -> usize {
        match self {
            Collection::Sequence(slots) => slots.iter().filter(|slot| slot.is_some()).count(),
            Collection::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerates the collection's own keys in natural order.
    ///
    /// Sequences yield the indices of defined slots. Mappings yield
    /// index-like names first in ascending numeric order, then the other
    /// names in insertion order.
    pub fn natural_keys(&self) -> Vec<CursorKey> {
        match self {
            Collection::Sequence(slots) => slots
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some())
                .map(|(index, _)| CursorKey::Index(index))
                .collect(),
            Collection::Mapping(entries) => {
                let mut indexed: Vec<(u64, &str)> = Vec::new();
                let mut named: Vec<&str> = Vec::new();
                for (name, _) in entries {
                    match canonical_index(name) {
                        Some(index) => indexed.push((index, name.as_str())),
                        None => named.push(name.as_str()),
                    }
                }
                indexed.sort_by_key(|(index, _)| *index);
                indexed
                    .into_iter()
                    .map(|(_, name)| name)
                    .chain(named)
                    .map(CursorKey::name)
                    .collect()
            }
        }
    }

    /// Looks up the value stored under `key`
    pub fn get(&self, key: &CursorKey) -> Option<&V> {
        match (self, key) {
            (Collection::Sequence(slots), CursorKey::Index(index)) => {
                slots.get(*index).and_then(Option::as_ref)
            }
            (Collection::Sequence(slots), CursorKey::Name(name)) => canonical_index(name)
                .and_then(|index| slots.get(usize::try_from(index).ok()?))
                .and_then(Option::as_ref),
            (Collection::Mapping(entries), CursorKey::Name(name)) => entries
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value),
            (Collection::Mapping(entries), CursorKey::Index(index)) => {
                let name = index.to_string();
                entries
                    .iter()
                    .find(|(existing, _)| *existing == name)
                    .map(|(_, value)| value)
            }
        }
    }
}

/// Parses a name that is a canonical array index ("0", "12", not "012" or "+1")
fn canonical_index(name: &str) -> Option<u64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if name.len() > 1 && name.starts_with('0') {
        return None;
    }
    name.parse::<u64>().ok().filter(|index| *index <= MAX_INDEX_NAME)
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> From<Vec<V>> for Collection<V> {
    fn from(values: Vec<V>) -> Self {
        Collection::from_vec(values)
    }
}

impl<V> FromIterator<(String, V)> for Collection<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Collection::from_entries(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_keys() {
        let collection = Collection::from_vec(vec!['a', 'b', 'c']);
        assert_eq!(
            collection.natural_keys(),
            vec![CursorKey::Index(0), CursorKey::Index(1), CursorKey::Index(2)]
        );
        assert_eq!(collection.get(&CursorKey::Index(1)), Some(&'b'));
        assert_eq!(collection.get(&"2".into()), Some(&'c'));
        assert_eq!(collection.get(&CursorKey::Index(3)), None);
    }

    #[test]
    fn test_sparse_sequence_skips_holes() {
        let collection = Collection::sparse(vec![Some(1), None, None, Some(4)]);
        assert_eq!(
            collection.natural_keys(),
            vec![CursorKey::Index(0), CursorKey::Index(3)]
        );
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(&CursorKey::Index(1)), None);
    }

    #[test]
    fn test_mapping_key_order() {
        let collection =
            Collection::from_entries(vec![("b", 1), ("10", 2), ("a", 3), ("2", 4), ("01", 5)]);
        assert_eq!(
            collection.natural_keys(),
            vec![
                CursorKey::name("2"),
                CursorKey::name("10"),
                CursorKey::name("b"),
                CursorKey::name("a"),
                CursorKey::name("01"),
            ]
        );
    }

    #[test]
    fn test_mapping_duplicate_replaces_in_place() {
        let collection = Collection::from_entries(vec![("x", 1), ("y", 2), ("x", 3)]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.get(&"x".into()), Some(&3));
        assert_eq!(
            collection.natural_keys(),
            vec![CursorKey::name("x"), CursorKey::name("y")]
        );
    }

    #[test]
    fn test_mapping_index_lookup() {
        let collection = Collection::from_entries(vec![("5", "five")]);
        assert_eq!(collection.get(&CursorKey::Index(5)), Some(&"five"));
    }

    #[test]
    fn test_empty_default() {
        let collection: Collection<u8> = Collection::default();
        assert!(collection.is_empty());
        assert!(collection.natural_keys().is_empty());
    }
}
