//! Functions implemented by the evaluator itself
//!
//! Internal functions take precedence over the host catalogue but are still
//! subject to the allowlist.

use std::fmt;

use crate::error::{EvaluationError, Result};
use crate::model::Value;
use crate::registry::function::FunctionError;

/// Built-in function with evaluator-defined semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFunction {
    /// `concat(args...)`: joins string forms without a separator
    Concat,
    /// `ifempty(a, b)`: `a` unless it is empty, else `b`
    IfEmpty,
}

impl InternalFunction {
    /// Every internal function
    pub const ALL: [InternalFunction; 2] = [InternalFunction::Concat, InternalFunction::IfEmpty];

    /// Resolve an internal function by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "concat" => Some(Self::Concat),
            "ifempty" => Some(Self::IfEmpty),
            _ => None,
        }
    }

    /// Function name as used in expressions
    pub fn name(self) -> &'static str {
        match self {
            Self::Concat => "concat",
            Self::IfEmpty => "ifempty",
        }
    }

    /// Apply the function to already evaluated arguments
    pub fn call(self, args: Vec<Value>) -> Result<Value> {
        match self {
            Self::Concat => concat(args),
            Self::IfEmpty => if_empty(args),
        }
    }
}

impl fmt::Display for InternalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn concat(args: Vec<Value>) -> Result<Value> {
    let binary = args.iter().any(|arg| matches!(arg, Value::Bytes(_)));
    let mut joined = Vec::new();
    for arg in &args {
        let bytes = arg.coerce_bytes().ok_or_else(|| {
            EvaluationError::function_failure(
                "concat",
                &FunctionError::evaluation("concat", "Array to string conversion"),
            )
        })?;
        joined.extend_from_slice(&bytes);
    }

    if binary {
        return Ok(Value::Bytes(joined));
    }
    // Every part came from a UTF-8 string
    Ok(Value::String(
        String::from_utf8(joined)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
    ))
}

fn if_empty(args: Vec<Value>) -> Result<Value> {
    let [value, fallback]: [Value; 2] =
        args.try_into()
            .map_err(|_| EvaluationError::BadArgumentCount {
                name: InternalFunction::IfEmpty.name().to_string(),
            })?;
    Ok(if value.is_empty_value() { fallback } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_from_name() {
        assert_eq!(InternalFunction::from_name("concat"), Some(InternalFunction::Concat));
        assert_eq!(InternalFunction::from_name("ifempty"), Some(InternalFunction::IfEmpty));
        assert_eq!(InternalFunction::from_name("md5"), None);
    }

    #[test]
    fn test_all_names_resolve() {
        for function in InternalFunction::ALL {
            assert_eq!(InternalFunction::from_name(function.name()), Some(function));
            assert_eq!(function.to_string(), function.name());
        }
    }

    #[test]
    fn test_concat_coerces_scalars() {
        let result = InternalFunction::Concat
            .call(vec![
                Value::string("a"),
                Value::Integer(1),
                Value::Float(2.5),
                Value::Bool(true),
                Value::Null,
            ])
            .unwrap();
        assert_eq!(result, Value::string("a12.51"));
    }

    #[test]
    fn test_concat_without_arguments() {
        assert_eq!(InternalFunction::Concat.call(vec![]).unwrap(), Value::string(""));
    }

    #[test]
    fn test_concat_keeps_binary_data() {
        let result = InternalFunction::Concat
            .call(vec![Value::Bytes(vec![0xff]), Value::string("a")])
            .unwrap();
        assert_eq!(result, Value::Bytes(vec![0xff, b'a']));
    }

    #[test]
    fn test_concat_rejects_arrays() {
        let err = InternalFunction::Concat
            .call(vec![Value::Array(vec![])])
            .unwrap_err();
        assert_eq!(err.to_string(), "concat(): Array to string conversion");
    }

    #[rstest]
    #[case(Value::string(""), Value::string("fallback"))]
    #[case(Value::string("0"), Value::string("fallback"))]
    #[case(Value::Integer(0), Value::string("fallback"))]
    #[case(Value::Null, Value::string("fallback"))]
    #[case(Value::Bool(false), Value::string("fallback"))]
    #[case(Value::Array(vec![]), Value::string("fallback"))]
    #[case(Value::string("x"), Value::string("x"))]
    #[case(Value::Integer(5), Value::Integer(5))]
    fn test_ifempty(#[case] value: Value, #[case] expected: Value) {
        let result = InternalFunction::IfEmpty
            .call(vec![value, Value::string("fallback")])
            .unwrap();
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![Value::string("a")])]
    #[case(vec![Value::string("a"), Value::string("b"), Value::string("c")])]
    fn test_ifempty_argument_count(#[case] args: Vec<Value>) {
        let err = InternalFunction::IfEmpty.call(args).unwrap_err();
        assert_eq!(err.to_string(), "Bad argument count for function 'ifempty'!");
    }
}
