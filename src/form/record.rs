use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field name → value payload for one form submission.
///
/// Keeps insertion order so the outbound body lists fields the way the
/// schema declares them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormRecord {
    fields: IndexMap<String, String>,
}

impl FormRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a field. Existing keys keep their position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// True when every value is the empty string.
    pub fn all_empty(&self) -> bool {
        self.fields.values().all(|v| v.is_empty())
    }

    /// Key/value pairs in order, as posted by the form channel.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Copy every field of `other` into `self`; `other` wins on collision.
    pub fn merge_from(&mut self, other: &FormRecord) {
        for (k, v) in other.iter() {
            self.insert(k, v);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = FormRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_declaration_order() {
        let mut r = FormRecord::new();
        r.insert("b", "1");
        r.insert("a", "2");
        r.insert("b", "3");
        let names: Vec<_> = r.names().collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(r.get("b"), Some("3"));
    }

    #[test]
    fn serializes_as_flat_json_object() {
        let r: FormRecord = [("Name", "A"), ("ID", "x")].into_iter().collect();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"Name":"A","ID":"x"}"#);
    }
}
