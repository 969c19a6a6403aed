//! Document payload shapes and relation-value coercion helpers.
//!
//! Relationship fields arrive in three shapes depending on query depth and
//! client: a bare id string, a numeric id, or a populated object carrying an
//! `id` key. All policy code goes through [`relation_id`] so the shape never
//! leaks into the predicates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Mutable field map of a document or a proposed mutation payload.
pub type Data = Map<String, Value>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub data: Data,
}

impl Document {
    pub fn new<S: Into<String>>(id: S, data: Data) -> Self {
        Self { id: id.into(), data }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}

/// Coerce a relation value to its id, whatever shape it arrived in.
pub fn relation_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => match obj.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
        _ => None,
    }
}

/// Ids of a many-valued relation field as a set, dropping unresolvable entries.
pub fn relation_ids(value: Option<&Value>) -> BTreeSet<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(relation_id).collect(),
        _ => BTreeSet::new(),
    }
}

/// Ids of a many-valued relation field in stored order, for rebuilding the list.
pub fn relation_id_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(relation_id).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relation_id_accepts_all_shapes() {
        assert_eq!(relation_id(&json!("u1")), Some("u1".into()));
        assert_eq!(relation_id(&json!(42)), Some("42".into()));
        assert_eq!(relation_id(&json!({"id": "u1", "name": "Alice"})), Some("u1".into()));
        assert_eq!(relation_id(&json!({"id": 7})), Some("7".into()));
        assert_eq!(relation_id(&json!({"name": "no id"})), None);
        assert_eq!(relation_id(&json!(null)), None);
        assert_eq!(relation_id(&json!(true)), None);
    }

    #[test]
    fn relation_ids_skips_junk() {
        let v = json!(["u1", {"id": "u2"}, null, {"name": "x"}, 3]);
        let ids = relation_ids(Some(&v));
        let expected: BTreeSet<String> = ["u1", "u2", "3"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
        assert!(relation_ids(Some(&json!("not an array"))).is_empty());
        assert!(relation_ids(None).is_empty());
    }
}
