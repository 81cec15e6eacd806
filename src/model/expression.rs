//! Classified expression tree
//!
//! A decoded configuration document is classified once, by shape, into an
//! [`Expression`]. The rules are:
//!
//! * an object with a `function` field is a [`FunctionCall`], whatever else it holds;
//! * otherwise an object with exactly one field naming a known namespace is a [`ParamRef`];
//! * any other object is a plain object whose fields are evaluated in place;
//! * arrays are sequences, everything else is a scalar.
//!
//! Malformed calls and references are kept in the tree and reported when
//! evaluation reaches them, so errors surface in evaluation order.

use indexmap::IndexMap;

use crate::error::{EvaluationError, Result};
use crate::model::{JsonValue, Value};
use crate::model::value::format_float;

/// Field holding the function name of a call
pub const FUNCTION_FIELD: &str = "function";

/// Field holding the arguments of a call
pub const ARGS_FIELD: &str = "args";

/// A classified expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal scalar, returned unchanged
    Scalar(Value),
    /// List whose elements are evaluated independently
    Sequence(Vec<Expression>),
    /// Function call
    FunctionCall(FunctionCall),
    /// Reference into a parameter table
    ParamRef(ParamRef),
    /// Object whose field values are evaluated in place
    PlainObject(IndexMap<String, Expression>),
}

/// A function call node
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Called function
    pub name: FunctionName,
    /// Call arguments
    pub args: CallArguments,
}

/// Name of a called function
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionName {
    /// Plain string name
    Named(String),
    /// Anything else, kept as canonical JSON for the error message
    Invalid(String),
}

/// Arguments of a function call
#[derive(Debug, Clone, PartialEq)]
pub enum CallArguments {
    /// Positional arguments, evaluated left to right
    List(Vec<Expression>),
    /// `args` held a scalar
    Invalid,
}

/// A parameter reference node, `{"namespace": "key"}`
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRef {
    /// Namespace of the referenced table
    pub namespace: String,
    /// Key inside the table
    pub key: ReferenceKey,
}

/// Key of a parameter reference
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceKey {
    /// String or number key, in string form
    Key(String),
    /// Non-scalar key, kept as canonical JSON for the error message
    Invalid(String),
}

impl Expression {
    /// Classify a decoded document
    ///
    /// `is_namespace` decides which single-field objects are references.
    /// Fails with [`EvaluationError::RecursionLimitExceeded`] when containers
    /// nest deeper than `max_depth`.
    pub fn classify(
        json: &JsonValue,
        is_namespace: &dyn Fn(&str) -> bool,
        max_depth: usize,
    ) -> Result<Self> {
        Classifier {
            is_namespace,
            max_depth,
        }
        .classify(json, 0)
    }

    /// Build a scalar node
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Build a call node with positional arguments
    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Self::FunctionCall(FunctionCall {
            name: FunctionName::Named(name.into()),
            args: CallArguments::List(args),
        })
    }

    /// Build a reference node
    pub fn reference(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ParamRef(ParamRef {
            namespace: namespace.into(),
            key: ReferenceKey::Key(key.into()),
        })
    }
}

struct Classifier<'a> {
    is_namespace: &'a dyn Fn(&str) -> bool,
    max_depth: usize,
}

impl Classifier<'_> {
    fn classify(&self, json: &JsonValue, depth: usize) -> Result<Expression> {
        match json {
            JsonValue::Array(items) => {
                self.check_depth(depth)?;
                let items = items
                    .iter()
                    .map(|item| self.classify(item, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expression::Sequence(items))
            }
            JsonValue::Object(fields) => {
                self.check_depth(depth)?;
                if let Some(name) = fields.get(FUNCTION_FIELD) {
                    let name = match name {
                        JsonValue::String(s) => FunctionName::Named(s.clone()),
                        other => FunctionName::Invalid(other.to_string()),
                    };
                    let args = self.classify_args(fields.get(ARGS_FIELD), depth + 1)?;
                    return Ok(Expression::FunctionCall(FunctionCall { name, args }));
                }

                if fields.len() == 1 {
                    if let Some((namespace, key)) = fields.iter().next() {
                        if (self.is_namespace)(namespace) {
                            log::trace!("Classified reference into namespace '{namespace}'");
                            return Ok(Expression::ParamRef(ParamRef {
                                namespace: namespace.clone(),
                                key: reference_key(key),
                            }));
                        }
                    }
                }

                let fields = fields
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), self.classify(v, depth + 1)?)))
                    .collect::<Result<IndexMap<_, _>>>()?;
                Ok(Expression::PlainObject(fields))
            }
            scalar => Ok(Expression::Scalar(Value::from_json(scalar))),
        }
    }

    fn classify_args(&self, args: Option<&JsonValue>, depth: usize) -> Result<CallArguments> {
        let items: Vec<&JsonValue> = match args {
            None | Some(JsonValue::Null) => return Ok(CallArguments::List(Vec::new())),
            Some(JsonValue::Array(items)) => items.iter().collect(),
            Some(JsonValue::Object(fields)) => fields.values().collect(),
            Some(_) => return Ok(CallArguments::Invalid),
        };
        self.check_depth(depth)?;
        items
            .into_iter()
            .map(|item| self.classify(item, depth + 1))
            .collect::<Result<Vec<_>>>()
            .map(CallArguments::List)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(EvaluationError::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}

fn reference_key(key: &JsonValue) -> ReferenceKey {
    match key {
        JsonValue::String(s) => ReferenceKey::Key(s.clone()),
        JsonValue::Number(n) => ReferenceKey::Key(match Value::from_number(n) {
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(f),
            _ => n.to_string(),
        }),
        other => ReferenceKey::Invalid(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn classify(json: JsonValue) -> Expression {
        Expression::classify(&json, &|ns| ns == "attr" || ns == "param", 32).unwrap()
    }

    #[test]
    fn test_function_field_wins_over_namespace() {
        let expr = classify(json!({"function": "md5", "attr": "x"}));
        assert_eq!(expr, Expression::call("md5", vec![]));
    }

    #[test]
    fn test_single_namespace_field_is_reference() {
        assert_eq!(classify(json!({"attr": "a.b"})), Expression::reference("attr", "a.b"));
        assert_eq!(classify(json!({"attr": 1})), Expression::reference("attr", "1"));
    }

    #[test]
    fn test_unknown_namespace_is_plain_object() {
        let expr = classify(json!({"data": "a"}));
        let mut fields = IndexMap::new();
        fields.insert("data".to_string(), Expression::scalar("a"));
        assert_eq!(expr, Expression::PlainObject(fields));
    }

    #[test]
    fn test_two_fields_are_plain_object() {
        assert!(matches!(
            classify(json!({"attr": "a", "param": "b"})),
            Expression::PlainObject(_)
        ));
    }

    #[test]
    fn test_non_string_function_name_is_kept_as_json() {
        let expr = classify(json!({"function": {"function": "concat", "args": ["di", "e"]}}));
        let Expression::FunctionCall(call) = expr else {
            panic!("expected call");
        };
        assert_eq!(
            call.name,
            FunctionName::Invalid(r#"{"function":"concat","args":["di","e"]}"#.to_string())
        );
    }

    #[test]
    fn test_non_scalar_reference_key_is_invalid() {
        let expr = classify(json!({"attr": {"placeholder": "placeholder"}}));
        assert_eq!(
            expr,
            Expression::ParamRef(ParamRef {
                namespace: "attr".to_string(),
                key: ReferenceKey::Invalid(r#"{"placeholder":"placeholder"}"#.to_string()),
            })
        );
    }

    #[test]
    fn test_args_shapes() {
        let Expression::FunctionCall(call) = classify(json!({"function": "time"})) else {
            panic!("expected call");
        };
        assert_eq!(call.args, CallArguments::List(vec![]));

        let Expression::FunctionCall(call) = classify(json!({"function": "md5", "args": "x"})) else {
            panic!("expected call");
        };
        assert_eq!(call.args, CallArguments::Invalid);
    }

    #[test]
    fn test_depth_limit() {
        let mut json = json!("leaf");
        for _ in 0..10 {
            json = json!([json]);
        }
        let err = Expression::classify(&json, &|_| false, 5).unwrap_err();
        assert_eq!(err, EvaluationError::RecursionLimitExceeded { limit: 5 });
        assert!(Expression::classify(&json, &|_| false, 11).is_ok());
    }
}
