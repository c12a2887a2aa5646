//! Attribute values and the insertion-ordered attribute map.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// A single unescaped attribute value.
///
/// `Bool(false)` is rendered as a bare attribute name (`disabled`), every
/// other value as `name="value"`. `Bool(true)` renders as `"1"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Plain string value.
    Text(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
}

impl AttrValue {
    /// Unescaped string form of the value.
    ///
    /// `Bool(false)` has no textual value and yields `""`.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(s) => Cow::Borrowed(s),
            Self::Bool(true) => Cow::Borrowed("1"),
            Self::Bool(false) => Cow::Borrowed(""),
            Self::Int(n) => Cow::Owned(n.to_string()),
        }
    }

    /// Whether this value renders as a bare attribute name.
    #[must_use]
    pub fn is_bare(&self) -> bool {
        matches!(self, Self::Bool(false))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for AttrValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

/// Attribute name to value mapping that remembers insertion order.
///
/// Replacing an existing key keeps its original position, new keys are
/// appended. Attribute lists are short, so lookups are linear.
///
/// # Example
///
/// ```
/// use elattr::{AttrMap, AttrValue};
///
/// let mut attrs = AttrMap::new();
/// attrs.insert("class", "entry");
/// attrs.insert("hidden", false);
/// attrs.insert("class", "entry entry--featured");
///
/// let names: Vec<_> = attrs.keys().collect();
/// assert_eq!(names, ["class", "hidden"]);
/// assert_eq!(attrs.get("class"), Some(&AttrValue::from("entry entry--featured")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Look up a value by attribute name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Whether the map contains `name`.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let index = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over attribute names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Lay `self` over `defaults`.
    ///
    /// The result keeps the order of `defaults`; values from `self` win on
    /// collision and keys only present in `self` are appended.
    #[must_use]
    pub fn merge_over(self, mut defaults: AttrMap) -> AttrMap {
        for (name, value) in self.entries {
            defaults.insert(name, value);
        }
        defaults
    }
}

impl<K, V> FromIterator<(K, V)> for AttrMap
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl IntoIterator for AttrMap {
    type Item = (String, AttrValue);
    type IntoIter = std::vec::IntoIter<(String, AttrValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for AttrMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Drop repeated classes, keeping the first occurrence of each.
pub(crate) fn dedup_classes(classes: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(classes.len());
    for class in classes {
        if !unique.contains(&class) {
            unique.push(class);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dedup_classes_keeps_first() {
        let classes = ["b", "a", "b", "", "a", ""].map(str::to_owned).to_vec();
        assert_eq!(dedup_classes(classes), vec!["b", "a", ""]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut attrs = AttrMap::new();
        attrs.insert("id", "a");
        attrs.insert("class", "b");
        let previous = attrs.insert("id", "c");

        assert_eq!(previous, Some(AttrValue::from("a")));
        assert_eq!(attrs.keys().collect::<Vec<_>>(), ["id", "class"]);
        assert_eq!(attrs.get("id"), Some(&AttrValue::from("c")));
    }

    #[test]
    fn test_remove() {
        let mut attrs: AttrMap = [("id", "a"), ("class", "b")].into_iter().collect();

        assert_eq!(attrs.remove("id"), Some(AttrValue::from("a")));
        assert_eq!(attrs.remove("id"), None);
        assert_eq!(attrs.len(), 1);
        assert!(!attrs.contains_key("id"));
    }

    #[test]
    fn test_merge_over_input_wins() {
        let defaults: AttrMap = [("class", "post"), ("id", "post-1")].into_iter().collect();
        let input: AttrMap = [("role", "article"), ("id", "custom")].into_iter().collect();

        let merged = input.merge_over(defaults);

        let pairs: Vec<_> = merged.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(
            pairs,
            vec![
                ("class", "post".to_owned()),
                ("id", "custom".to_owned()),
                ("role", "article".to_owned()),
            ]
        );
    }

    #[test]
    fn test_as_text() {
        assert_eq!(AttrValue::from("x").as_text(), "x");
        assert_eq!(AttrValue::Bool(true).as_text(), "1");
        assert_eq!(AttrValue::Bool(false).as_text(), "");
        assert_eq!(AttrValue::Int(-4).as_text(), "-4");
        assert!(AttrValue::Bool(false).is_bare());
        assert!(!AttrValue::Bool(true).is_bare());
    }

    #[test]
    fn test_serialize_preserves_order() {
        let attrs: AttrMap = [
            ("z", AttrValue::from("last-name-first")),
            ("a", AttrValue::Bool(false)),
            ("m", AttrValue::Int(3)),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"z":"last-name-first","a":false,"m":3}"#);
    }
}
