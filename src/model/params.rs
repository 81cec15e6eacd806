//! Parameter tables that references are resolved against
//!
//! A parameter set maps a namespace (`attr`, `param`, `time`, ...) to a flat
//! table. Nested values are flattened into dot-joined keys, so
//! `{"attr": {"test": {"secret": "x"}}}` is reachable as `{"attr": "test.secret"}`.

use indexmap::IndexMap;

use crate::error::{EvaluationError, Result};
use crate::model::{JsonValue, Value};

/// A single flattened namespace table
pub type FlatTable = IndexMap<String, Value>;

/// Flatten a JSON object or array into dot-joined keys
///
/// Array elements are keyed by their index. Empty nested containers leave no
/// entry behind.
pub fn flatten(json: &JsonValue) -> FlatTable {
    let mut table = FlatTable::new();
    flatten_into(json, "", &mut table);
    table
}

fn flatten_into(json: &JsonValue, prefix: &str, table: &mut FlatTable) {
    match json {
        JsonValue::Object(fields) => {
            for (key, value) in fields {
                flatten_child(value, prefix, key, table);
            }
        }
        JsonValue::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_child(value, prefix, &index.to_string(), table);
            }
        }
        scalar => {
            table.insert(prefix.to_string(), Value::from_json(scalar));
        }
    }
}

fn flatten_child(value: &JsonValue, prefix: &str, key: &str, table: &mut FlatTable) {
    let path = if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    };
    match value {
        JsonValue::Object(_) | JsonValue::Array(_) => flatten_into(value, &path, table),
        scalar => {
            table.insert(path, Value::from_json(scalar));
        }
    }
}

/// Namespaced parameter tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTables {
    tables: IndexMap<String, FlatTable>,
}

impl ParameterTables {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameter tables from a JSON object of namespaces
    ///
    /// Every namespace must hold an object or array; `null` means no tables.
    pub fn from_json(params: &JsonValue) -> Result<Self> {
        let namespaces = match params {
            JsonValue::Null => return Ok(Self::new()),
            JsonValue::Object(namespaces) => namespaces,
            _ => {
                return Err(EvaluationError::MalformedParameterTable {
                    namespace: String::new(),
                });
            }
        };

        let mut tables = Self::new();
        for (namespace, table) in namespaces {
            match table {
                JsonValue::Object(_) | JsonValue::Array(_) => {
                    tables.insert_table(namespace.clone(), flatten(table));
                }
                _ => {
                    log::warn!("Parameter namespace '{namespace}' is not a map");
                    return Err(EvaluationError::MalformedParameterTable {
                        namespace: namespace.clone(),
                    });
                }
            }
        }
        Ok(tables)
    }

    /// Add or replace a namespace table
    pub fn insert_table(&mut self, namespace: impl Into<String>, table: FlatTable) {
        self.tables.insert(namespace.into(), table);
    }

    /// Set a single value, creating the namespace when needed
    pub fn insert(
        &mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.tables
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Check if a namespace is known
    pub fn contains_namespace(&self, namespace: &str) -> bool {
        self.tables.contains_key(namespace)
    }

    /// Look up a key; null values count as missing
    pub fn get(&self, namespace: &str, key: &str) -> Option<&Value> {
        self.tables
            .get(namespace)
            .and_then(|table| table.get(key))
            .filter(|value| !value.is_null())
    }

    /// Iterate over namespace names
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of namespaces
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if there are no namespaces
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_objects() {
        let table = flatten(&json!({
            "apiKey": "someApiKey",
            "test": {"secret": "shh"},
            "a": {"b": {"c": 1}}
        }));
        let keys: Vec<&str> = table.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["apiKey", "test.secret", "a.b.c"]);
        assert_eq!(table["a.b.c"], Value::Integer(1));
    }

    #[test]
    fn test_flatten_arrays_by_index() {
        let table = flatten(&json!({"job": [{"success": "yes"}, {"success": "no"}]}));
        assert_eq!(table["job.0.success"], Value::string("yes"));
        assert_eq!(table["job.1.success"], Value::string("no"));
    }

    #[test]
    fn test_flatten_drops_empty_containers() {
        let table = flatten(&json!({"empty": {}, "list": [], "kept": 0}));
        assert_eq!(table.len(), 1);
        assert!(table.contains_key("kept"));
    }

    #[test]
    fn test_flat_table_is_unchanged() {
        let table = flatten(&json!({"a.b": "String", "c": "Woah"}));
        assert_eq!(table["a.b"], Value::string("String"));
        assert_eq!(table["c"], Value::string("Woah"));
    }

    #[test]
    fn test_from_json_rejects_scalar_namespace() {
        let err = ParameterTables::from_json(&json!({"attr": {}, "time": 5})).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::MalformedParameterTable {
                namespace: "time".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "The params for code builder must be an array of arrays!"
        );
    }

    #[test]
    fn test_from_json_rejects_scalar_root() {
        assert!(ParameterTables::from_json(&json!("attr")).is_err());
        assert!(ParameterTables::from_json(&JsonValue::Null).unwrap().is_empty());
    }

    #[test]
    fn test_null_values_count_as_missing() {
        let tables = ParameterTables::from_json(&json!({"attr": {"gone": null, "zero": 0}})).unwrap();
        assert!(tables.contains_namespace("attr"));
        assert_eq!(tables.get("attr", "gone"), None);
        assert_eq!(tables.get("attr", "zero"), Some(&Value::Integer(0)));
    }

    #[test]
    fn test_insert_builds_namespaces() {
        let mut tables = ParameterTables::new();
        tables.insert("attr", "c", "Bat").insert("param", "a.b", 2i64);
        assert_eq!(tables.namespaces().collect::<Vec<_>>(), vec!["attr", "param"]);
        assert_eq!(tables.get("param", "a.b"), Some(&Value::Integer(2)));
    }
}
