use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Coerce a vendor value into a boolean the way agents report them:
/// real booleans, `"true"/"yes"/"1"` style strings, or 0/1 numbers.
pub fn bool_like(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Flat key/value facts pulled out of one call delivery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedFacts(Map<String, Value>);

impl ExtractedFacts {
    pub fn new() -> Self {
        Self::default()
    }

    /// First writer wins; nulls are never stored
    pub fn set_default(&mut self, key: &str, value: Value) {
        if value.is_null() || self.0.contains_key(key) {
            return;
        }
        self.0.insert(key.to_string(), value);
    }

    /// Like [`set_default`](Self::set_default) but also skips empty strings
    pub fn set_default_text(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.set_default(key, Value::String(value.to_string()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// String facts, with numbers rendered as text; blank strings read as absent
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get_bool_like(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(bool_like)
    }

    /// Copy every key from `other` that is not already present
    pub fn fill_missing_from(&mut self, other: &Map<String, Value>) {
        for (key, value) in other {
            self.set_default(key, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ExtractedFacts {
    fn from(map: Map<String, Value>) -> Self {
        let mut facts = Self::new();
        facts.fill_missing_from(&map);
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_like_coercion() {
        assert_eq!(bool_like(&json!(true)), Some(true));
        assert_eq!(bool_like(&json!("Yes")), Some(true));
        assert_eq!(bool_like(&json!("0")), Some(false));
        assert_eq!(bool_like(&json!(1)), Some(true));
        assert_eq!(bool_like(&json!("maybe")), None);
        assert_eq!(bool_like(&json!(null)), None);
    }

    #[test]
    fn test_first_writer_wins() {
        let mut facts = ExtractedFacts::new();
        facts.set_default("provider_name", json!("Dr. Sarah Chen"));
        facts.set_default("provider_name", json!("Dr. Someone Else"));
        facts.set_default("patient_name", Value::Null);
        facts.set_default_text("member_id", "   ");

        assert_eq!(facts.get_str("provider_name").as_deref(), Some("Dr. Sarah Chen"));
        assert!(!facts.contains("patient_name"));
        assert!(!facts.contains("member_id"));
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn test_fill_missing_keeps_existing() {
        let mut facts = ExtractedFacts::new();
        facts.set_default("found", json!(true));

        let analysis = json!({"found": false, "call_successful": "success"});
        if let Value::Object(map) = analysis {
            facts.fill_missing_from(&map);
        }
        assert_eq!(facts.get_bool_like("found"), Some(true));
        assert_eq!(facts.get_str("call_successful").as_deref(), Some("success"));
    }
}
