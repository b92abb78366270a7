use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free association between a typed value and its display
/// label. Backs enumerated fields and toggle cycle labels.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct TranslationMap<T> {
    entries: Vec<(T, String)>,
}

impl<T> Default for TranslationMap<T> {
    fn default() -> Self {
        TranslationMap {
            entries: Vec::new(),
        }
    }
}

impl<T: PartialEq> TranslationMap<T> {
    pub fn new() -> TranslationMap<T> {
        Default::default()
    }

    /// Appends an entry. Returns `false` and leaves the map untouched if the
    /// value or the label is already present.
    pub fn insert(&mut self, value: T, label: impl Into<String>) -> bool {
        let label = label.into();
        let duplicate = self
            .entries
            .iter()
            .any(|(v, l)| *v == value || *l == label);
        if duplicate {
            return false;
        }
        self.entries.push((value, label));
        true
    }

    /// Returns the label associated with the given value.
    pub fn label_of(&self, value: &T) -> Option<&str> {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, l)| l.as_str())
    }

    /// Returns the value associated with the given label.
    pub fn value_of(&self, label: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(_, l)| l == label)
            .map(|(v, _)| v)
    }

    /// Returns the position of the given value in entry order.
    pub fn position(&self, value: &T) -> Option<usize> {
        self.entries.iter().position(|(v, _)| v == value)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(v, _)| v)
    }

    pub fn entries(&self) -> &[(T, String)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: PartialEq> FromIterator<(T, String)> for TranslationMap<T> {
    fn from_iter<I: IntoIterator<Item = (T, String)>>(iter: I) -> Self {
        let mut map = TranslationMap::new();
        for (value, label) in iter {
            map.insert(value, label);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Token;

    fn sample() -> TranslationMap<Token> {
        let mut map = TranslationMap::new();
        map.insert(Token::new(0), "Low");
        map.insert(Token::new(1), "Mid");
        map.insert(Token::new(2), "High");
        map
    }

    #[test]
    fn lookup_both_directions() {
        let map = sample();
        assert_eq!(map.label_of(&Token::new(1)), Some("Mid"));
        assert_eq!(map.value_of("High"), Some(&Token::new(2)));
        assert_eq!(map.label_of(&Token::new(9)), None);
    }

    #[test]
    fn rejects_duplicates() {
        let mut map = sample();
        assert!(!map.insert(Token::new(1), "Other"));
        assert!(!map.insert(Token::new(9), "Mid"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn preserves_order() {
        let map = sample();
        let positions: Vec<_> = map.values().map(|t| t.index()).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(map.position(&Token::new(2)), Some(2));
    }

    #[test]
    fn serde_round_trip_preserves_order() {
        let map = sample();
        let json = serde_json::to_string(&map).unwrap();
        let restored: TranslationMap<Token> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, map);
    }
}
