//! Hiding notes by frontmatter properties.
//!
//! A rule is either a bare property key (`private`), which hides any note that has the property,
//! or `key=value` (`status=archived`), which hides notes whose property value matches. Keys and
//! values are compared trimmed and case-folded. For list values any matching element is enough.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Frontmatter of a note as parsed by the host.
pub type Frontmatter = Map<String, Value>;

/// What a property must look like to hide a note.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct PropertyCriteria {
    /// A bare key rule exists, any value hides.
    any_value: bool,

    /// Normalized values from `key=value` rules.
    values: Vec<String>,
}

/// A single parsed rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRule {
    pub key: String,
    pub value: Option<String>,
}

impl PropertyRule {
    /// Parse a raw rule, returns `None` if no key is left after trimming.
    pub fn parse(rule: &str) -> Option<Self> {
        let (key, value) = match rule.split_once('=') {
            Some((key, value)) => (key, Some(normalize_value(value))),
            None => (rule, None),
        };

        let key = key.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        Some(Self {
            key,
            // `key=` with nothing after it is treated like a bare key
            value: value.filter(|value| !value.is_empty()),
        })
    }
}

/// Compiled matcher over a set of frontmatter property rules.
#[derive(Clone, Debug, Default)]
pub struct FrontmatterPropertyMatcher {
    criteria: HashMap<String, PropertyCriteria>,
}

impl FrontmatterPropertyMatcher {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut criteria: HashMap<String, PropertyCriteria> = HashMap::new();
        for rule in rules.into_iter().filter_map(|rule| PropertyRule::parse(rule.as_ref())) {
            let entry = criteria.entry(rule.key).or_default();
            match rule.value {
                Some(value) => {
                    if !entry.values.contains(&value) {
                        entry.values.push(value);
                    }
                }
                None => entry.any_value = true,
            }
        }
        Self { criteria }
    }

    /// Whether any rule is configured at all. Callers skip the frontmatter lookup otherwise.
    pub fn has_criteria(&self) -> bool {
        !self.criteria.is_empty()
    }

    /// Check whether a frontmatter record is hidden by any rule.
    pub fn matches(&self, record: &Frontmatter) -> bool {
        if self.criteria.is_empty() {
            return false;
        }

        record.iter().any(|(key, value)| {
            let key = key.trim().to_lowercase();
            match self.criteria.get(&key) {
                Some(criteria) if criteria.any_value => true,
                Some(criteria) => criteria
                    .values
                    .iter()
                    .any(|expected| value_matches(value, expected)),
                None => false,
            }
        })
    }
}

fn normalize_value(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Compare a frontmatter value against a normalized configured value.
fn value_matches(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => normalize_value(s) == expected,
        Value::Number(n) => number_matches(n, expected),
        Value::Bool(b) => (if *b { "true" } else { "false" }) == expected,
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        Value::Null | Value::Object(_) => false,
    }
}

/// Numbers compare by value, so `priority=3` matches a stored `3.0`.
fn number_matches(value: &serde_json::Number, expected: &str) -> bool {
    match (value.as_f64(), expected.parse::<f64>()) {
        (Some(value), Ok(expected)) => value == expected,
        _ => value.to_string() == expected,
    }
}

#[cfg(test)]
fn record(value: Value) -> Frontmatter {
    match value {
        Value::Object(map) => map,
        _ => panic!("frontmatter fixture must be an object"),
    }
}

#[test]
fn test_parse_rules() {
    assert_eq!(
        PropertyRule::parse(" Status = Archived "),
        Some(PropertyRule {
            key: "status".to_string(),
            value: Some("archived".to_string()),
        })
    );
    assert_eq!(
        PropertyRule::parse("private"),
        Some(PropertyRule {
            key: "private".to_string(),
            value: None,
        })
    );
    assert_eq!(
        PropertyRule::parse("draft="),
        Some(PropertyRule {
            key: "draft".to_string(),
            value: None,
        })
    );
    assert_eq!(PropertyRule::parse("=value"), None);
    assert_eq!(PropertyRule::parse("   "), None);
}

#[test]
fn test_bare_key() {
    let matcher = FrontmatterPropertyMatcher::new(["Private"]);
    assert!(matcher.has_criteria());
    assert!(matcher.matches(&record(serde_json::json!({ "private": true }))));
    assert!(matcher.matches(&record(serde_json::json!({ "PRIVATE": null }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "public": true }))));
}

#[test]
fn test_key_value() {
    let matcher = FrontmatterPropertyMatcher::new(["status=archived", "priority=3", "hide=true"]);
    assert!(matcher.matches(&record(serde_json::json!({ "Status": " Archived " }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "status": "active" }))));
    assert!(matcher.matches(&record(serde_json::json!({ "priority": 3 }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "priority": 4 }))));
    assert!(matcher.matches(&record(serde_json::json!({ "priority": 3.0 }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "priority": 3.5 }))));
    assert!(matcher.matches(&record(serde_json::json!({ "hide": true }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "hide": false }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "status": null }))));
}

#[test]
fn test_array_any_element() {
    let matcher = FrontmatterPropertyMatcher::new(["tags=secret"]);
    assert!(matcher.matches(&record(serde_json::json!({ "tags": ["work", "Secret"] }))));
    assert!(!matcher.matches(&record(serde_json::json!({ "tags": ["work"] }))));
}

#[test]
fn test_bare_key_wins_over_values() {
    let matcher = FrontmatterPropertyMatcher::new(["status=archived", "status"]);
    assert!(matcher.matches(&record(serde_json::json!({ "status": "active" }))));
}

#[test]
fn test_no_criteria() {
    let matcher = FrontmatterPropertyMatcher::new(["", "="]);
    assert!(!matcher.has_criteria());
    assert!(!matcher.matches(&record(serde_json::json!({ "a": 1 }))));
}
