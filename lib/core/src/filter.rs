// Exact-match attribute filters over catalog records
use crate::catalog::ToolRecord;
use serde_json::Value;
use std::collections::BTreeMap;

pub trait Filter {
    fn matches(&self, tool: &ToolRecord) -> bool;
}

/// Value of a record attribute as seen by filters
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    /// Known attribute without a value (e.g. no release year)
    Missing,
}

/// Look up a filterable attribute. `None` means the name is not an attribute.
pub fn field_value<'a>(tool: &'a ToolRecord, field: &str) -> Option<FieldValue<'a>> {
    let value = match field {
        "tool_name" | "name" => FieldValue::Text(&tool.tool_name),
        "company" => FieldValue::Text(&tool.company),
        "category" | "category_canonical" => FieldValue::Text(&tool.category),
        "modality" | "modality_canonical" => FieldValue::Text(&tool.modality),
        "website" => FieldValue::Text(&tool.website),
        "api_status" => FieldValue::Text(&tool.api_status),
        "release_year" => match tool.release_year {
            Some(y) => FieldValue::Number(f64::from(y)),
            None => FieldValue::Missing,
        },
        flag => {
            let set = tool.flags.get(flag)?;
            FieldValue::Number(if set { 1.0 } else { 0.0 })
        }
    };
    Some(value)
}

/// Conjunction of `attribute == value` constraints
///
/// Unknown attribute names are ignored. An empty filter accepts everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    conditions: BTreeMap<String, Value>,
}

impl AttributeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.conditions.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.conditions.remove(field)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    fn value_matches(actual: &FieldValue<'_>, expected: &Value) -> bool {
        match (actual, expected) {
            (FieldValue::Missing, _) => false,
            (FieldValue::Text(a), Value::String(e)) => a == e,
            (FieldValue::Number(a), Value::Number(e)) => e.as_f64() == Some(*a),
            (FieldValue::Number(a), Value::Bool(e)) => *a == if *e { 1.0 } else { 0.0 },
            _ => false,
        }
    }
}

impl Filter for AttributeFilter {
    fn matches(&self, tool: &ToolRecord) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            match field_value(tool, field) {
                Some(actual) => Self::value_matches(&actual, expected),
                None => true,
            }
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for AttributeFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool() -> ToolRecord {
        ToolRecord::new("Llama")
            .with_company("Meta")
            .with_category("Chatbot")
            .with_flag("open_source", true)
    }

    #[test]
    fn test_empty_filter_accepts() {
        assert!(AttributeFilter::new().matches(&tool()));
    }

    #[test]
    fn test_flag_filters_are_conjunctive() {
        let f = AttributeFilter::new().with("open_source", 1).with("api_available", 1);
        assert!(!f.matches(&tool()));
        let f = AttributeFilter::new().with("open_source", 1).with("api_available", 0);
        assert!(f.matches(&tool()));
    }

    #[test]
    fn test_numeric_and_bool_values() {
        assert!(AttributeFilter::new().with("open_source", json!(1.0)).matches(&tool()));
        assert!(AttributeFilter::new().with("open_source", true).matches(&tool()));
        assert!(!AttributeFilter::new().with("open_source", "1").matches(&tool()));
    }

    #[test]
    fn test_unknown_key_ignored() {
        let f = AttributeFilter::new().with("popularity", 5);
        assert!(f.matches(&tool()));
    }

    #[test]
    fn test_flag_field_values() {
        let tool = tool();
        assert_eq!(field_value(&tool, "open_source"), Some(FieldValue::Number(1.0)));
        assert_eq!(field_value(&tool, "mod_text"), Some(FieldValue::Number(0.0)));
        assert_eq!(field_value(&tool, "mod_smell"), None);
        assert!(AttributeFilter::new().with("mod_smell", 1).matches(&tool));
        assert!(!AttributeFilter::new().with("mod_text", 1).matches(&tool));
    }

    #[test]
    fn test_string_match_is_exact() {
        assert!(AttributeFilter::new().with("company", "Meta").matches(&tool()));
        assert!(!AttributeFilter::new().with("company", "meta").matches(&tool()));
    }

    #[test]
    fn test_missing_year_fails() {
        let f = AttributeFilter::new().with("release_year", 2023);
        assert!(!f.matches(&tool()));
        assert!(f.matches(&tool().with_release_year(2023)));
    }
}
