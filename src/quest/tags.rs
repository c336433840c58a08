//! Multi-select tag lists.

use serde::{Deserialize, Deserializer, Serialize};

/// An insertion-ordered list of unique tags with toggle semantics.
///
/// Deserialization drops duplicates so the uniqueness invariant holds for
/// profiles that arrive over the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tag` if absent, remove it if present.
    /// Returns whether the tag is selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|t| t == tag) {
            self.0.remove(pos);
            false
        } else {
            self.0.push(tag.to_string());
            true
        }
    }

    /// Append `tag` unless it is already present. Returns `true` if appended.
    pub fn insert(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = TagList::new();
        for tag in iter {
            list.insert(tag.as_ref());
        }
        list
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_then_removes() {
        let mut tags = TagList::new();
        assert!(tags.toggle("GDPR"));
        assert!(tags.contains("GDPR"));
        assert!(!tags.toggle("GDPR"));
        assert!(tags.is_empty());
    }

    #[test]
    fn double_toggle_restores_order_of_remaining_items() {
        let mut tags: TagList = ["SAP", "Oracle", "Workday"].into_iter().collect();
        let before = tags.clone();

        tags.toggle("Oracle");
        assert_eq!(tags.as_slice(), ["SAP", "Workday"]);
        tags.toggle("Oracle");
        // Re-added at the end; remaining items keep their relative order.
        assert_eq!(tags.as_slice(), ["SAP", "Workday", "Oracle"]);

        tags.toggle("Salesforce");
        tags.toggle("Salesforce");
        assert_eq!(tags.len(), before.len());
        for tag in before.iter() {
            assert!(tags.contains(tag));
        }
    }

    #[test]
    fn toggling_an_absent_tag_twice_is_identity() {
        let mut tags: TagList = ["A", "B", "C"].into_iter().collect();
        let before = tags.clone();
        tags.toggle("D");
        tags.toggle("D");
        assert_eq!(tags, before);
    }

    #[test]
    fn insert_is_idempotent() {
        let mut tags = TagList::new();
        assert!(tags.insert("Rust"));
        assert!(!tags.insert("Rust"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn deserialize_drops_duplicates() {
        let tags: TagList = serde_json::from_str(r#"["GDPR","HIPAA","GDPR"]"#).unwrap();
        assert_eq!(tags.as_slice(), ["GDPR", "HIPAA"]);
        assert_eq!(serde_json::to_string(&tags).unwrap(), r#"["GDPR","HIPAA"]"#);
    }
}
