//! Form Values - Mutable Snapshot of User Input
//!
//! Values are addressed by dotted path (`reassignment.reason`). Nested
//! sections stay nested; nothing is flattened.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize};

pub const PATH_SEPARATOR: char = '.';

/// A single input value.
///
/// JSON form is untagged: a string, an array of strings, or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Choices(IndexSet<String>),
    Group(FormValues),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn choices<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Choices(items.into_iter().map(Into::into).collect())
    }

    /// True when the user has effectively entered nothing
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Choices(set) => set.is_empty(),
            FieldValue::Group(values) => values.is_blank(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_choices(&self) -> Option<&IndexSet<String>> {
        match self {
            FieldValue::Choices(set) => Some(set),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&FormValues> {
        match self {
            FieldValue::Group(values) => Some(values),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Choices(_) => "choices",
            FieldValue::Group(_) => "group",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<FormValues> for FieldValue {
    fn from(value: FormValues) -> Self {
        FieldValue::Group(value)
    }
}

/// Insertion-ordered mapping from field name to value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormValues {
    entries: IndexMap<String, FieldValue>,
}

/// `null` entries are dropped, so they read as blank
impl<'de> Deserialize<'de> for FormValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Option<FieldValue>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect())
    }
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.entries.values().all(FieldValue::is_blank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builder-style insert of a top-level (or dotted) value
    pub fn with(mut self, path: &str, value: impl Into<FieldValue>) -> Self {
        self.set(path, value);
        self
    }

    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        match path.split_once(PATH_SEPARATOR) {
            None => self.entries.get(path),
            Some((head, rest)) => self.entries.get(head)?.as_group()?.get(rest),
        }
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(FieldValue::as_text)
    }

    pub fn choices(&self, path: &str) -> Option<&IndexSet<String>> {
        self.get(path).and_then(FieldValue::as_choices)
    }

    pub fn group(&self, path: &str) -> Option<&FormValues> {
        self.get(path).and_then(FieldValue::as_group)
    }

    /// Write a value, creating intermediate groups as needed.
    ///
    /// A non-group value sitting on an intermediate segment is replaced.
    pub fn set(&mut self, path: &str, value: impl Into<FieldValue>) {
        let value = value.into();
        match path.split_once(PATH_SEPARATOR) {
            None => {
                self.entries.insert(path.to_string(), value);
            }
            Some((head, rest)) => {
                let slot = self
                    .entries
                    .entry(head.to_string())
                    .or_insert_with(|| FieldValue::Group(FormValues::new()));
                if !matches!(slot, FieldValue::Group(_)) {
                    *slot = FieldValue::Group(FormValues::new());
                }
                if let FieldValue::Group(group) = slot {
                    group.set(rest, value);
                }
            }
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<FieldValue> {
        match path.split_once(PATH_SEPARATOR) {
            None => self.entries.shift_remove(path),
            Some((head, rest)) => match self.entries.get_mut(head)? {
                FieldValue::Group(group) => group.remove(rest),
                _ => None,
            },
        }
    }

    /// Add or remove one option of a multi-choice value.
    ///
    /// Returns true when the selection changed.
    pub fn set_choice(&mut self, path: &str, option: &str, checked: bool) -> bool {
        let mut set = self.choices(path).cloned().unwrap_or_default();
        let changed = if checked {
            set.insert(option.to_string())
        } else {
            set.shift_remove(option)
        };
        if changed || self.choices(path).is_none() {
            self.set(path, FieldValue::Choices(set));
        }
        changed
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_paths_read_and_write() {
        let mut values = FormValues::new();
        values.set("leadSource", "Referral");
        values.set("reassignment.reason", "workload");

        assert_eq!(values.text("leadSource"), Some("Referral"));
        assert_eq!(values.text("reassignment.reason"), Some("workload"));
        assert!(values.group("reassignment").is_some());
        assert_eq!(values.text("reassignment.missing"), None);
        assert_eq!(values.text("leadSource.nested"), None);
    }

    #[test]
    fn test_remove_nested() {
        let mut values = FormValues::new().with("a.b", "x").with("a.c", "y");
        assert_eq!(values.remove("a.b"), Some(FieldValue::text("x")));
        assert_eq!(values.text("a.c"), Some("y"));
        assert_eq!(values.remove("a.b"), None);
    }

    #[test]
    fn test_choice_toggle_restores_prior_set() {
        let mut values = FormValues::new().with("concerns", FieldValue::choices(["editing"]));
        let before = values.clone();

        assert!(values.set_choice("concerns", "distribution", true));
        assert_eq!(
            values.choices("concerns").map(|s| s.iter().cloned().collect::<Vec<_>>()),
            Some(vec!["editing".to_string(), "distribution".to_string()])
        );
        assert!(values.set_choice("concerns", "distribution", false));
        assert_eq!(values, before);

        // selecting an already-selected option is a no-op
        assert!(!values.set_choice("concerns", "editing", true));
        assert_eq!(values, before);
    }

    #[test]
    fn test_untagged_json_shape() {
        let values: FormValues = serde_json::from_value(json!({
            "bookTitle": "Dune",
            "concerns": ["editing", "distribution"],
            "reassignment": { "reason": "workload" }
        }))
        .unwrap();

        assert_eq!(values.text("bookTitle"), Some("Dune"));
        assert_eq!(values.choices("concerns").map(|s| s.len()), Some(2));
        assert_eq!(values.text("reassignment.reason"), Some("workload"));

        let back = serde_json::to_value(&values).unwrap();
        assert_eq!(back["concerns"], json!(["editing", "distribution"]));
    }

    #[test]
    fn test_blank_detection() {
        assert!(FieldValue::text("   ").is_blank());
        assert!(FieldValue::Choices(IndexSet::new()).is_blank());
        let group = FormValues::new().with("a", "").with("b", "  ");
        assert!(FieldValue::Group(group).is_blank());
        assert!(!FieldValue::text("x").is_blank());
    }

    #[test]
    fn test_null_entries_read_as_blank() {
        let values: FormValues = serde_json::from_value(json!({
            "bookTitle": "Dune",
            "followUp": null,
            "reassignment": { "reason": null, "newAssignee": "agent2" }
        }))
        .unwrap();

        assert_eq!(values.len(), 2);
        assert!(values.get("followUp").is_none());
        assert!(values.get("reassignment.reason").is_none());
        assert_eq!(values.text("reassignment.newAssignee"), Some("agent2"));
    }
}
