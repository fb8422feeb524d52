//! Unique-key attribute mapping shared by directives and the comment metadata channel.

use serde::Serialize;

/// Attribute name to value mapping.
///
/// Keys are unique; inserting an existing key replaces its value in place. Insertion
/// order is kept so emitted markers are stable, but equality ignores it.
#[derive(Debug, Clone, Default, Eq, Serialize)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder-style [`Attributes::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Attributes {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_key() {
        let mut attrs = Attributes::new();
        attrs.insert("source", "a.png");
        attrs.insert("border", "true");
        attrs.insert("source", "b.png");

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("source"), Some("b.png"));
        assert_eq!(attrs.iter().next(), Some(("source", "b.png")));
    }

    #[test]
    fn equality_ignores_order() {
        let a: Attributes = [("x", "1"), ("y", "2")].into_iter().collect();
        let b: Attributes = [("y", "2"), ("x", "1")].into_iter().collect();
        let c: Attributes = [("y", "2"), ("x", "3")].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn remove_returns_value() {
        let mut attrs = Attributes::new().with("directive", "code").with("language", "rust");
        assert_eq!(attrs.remove("directive").as_deref(), Some("code"));
        assert!(!attrs.contains_key("directive"));
        assert_eq!(attrs.remove("missing"), None);
    }
}
