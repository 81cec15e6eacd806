//! implode() function - joins array elements

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionError, FunctionResult, HostFunction};
use crate::registry::functions::{join_element, string_arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// implode() function - `implode(separator, array)` or `implode(array)`
pub struct ImplodeFunction;

impl ImplodeFunction {
    fn elements<'a>(&self, value: &'a Value, index: usize) -> FunctionResult<Vec<&'a Value>> {
        match value {
            Value::Array(items) => Ok(items.iter().collect()),
            Value::Object(fields) => Ok(fields.values().collect()),
            other => Err(FunctionError::InvalidArgumentType {
                name: self.name().to_string(),
                index,
                param: "array".to_string(),
                expected: if index == 0 { "array" } else { "?array" }.to_string(),
                actual: other.type_info().to_string(),
            }),
        }
    }
}

impl HostFunction for ImplodeFunction {
    fn name(&self) -> &str {
        "implode"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "implode",
                vec![
                    ParameterInfo::required("separator", TypeInfo::Any),
                    ParameterInfo::optional("array", TypeInfo::Any),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Joins array elements with a separator string. With a single argument the elements are joined without a separator."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let (separator, elements) = match args {
            [_, pieces] => (
                string_arg(self.name(), args, 0, "separator")?.into_owned(),
                self.elements(pieces, 1)?,
            ),
            _ => (
                String::new(),
                self.elements(args.first().unwrap_or(&Value::Null), 0)?,
            ),
        };

        let parts = elements
            .into_iter()
            .map(|value| join_element(self.name(), value))
            .collect::<FunctionResult<Vec<_>>>()?;
        Ok(Value::String(parts.join(&separator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn implode(args: &[Value]) -> FunctionResult<Value> {
        ImplodeFunction.evaluate(args, &FunctionContext::default())
    }

    #[test]
    fn test_implode_with_separator() {
        let items = Value::Array(vec![
            Value::string("123"),
            Value::string("GET"),
            Value::string("\n"),
        ]);
        assert_eq!(
            implode(&[Value::string("\n"), items]).unwrap(),
            Value::string("123\nGET\n\n")
        );
    }

    #[test]
    fn test_implode_single_array() {
        let items = Value::Array(vec![Value::Integer(1), Value::Bool(true), Value::Null]);
        assert_eq!(implode(&[items]).unwrap(), Value::string("11"));
    }

    #[test]
    fn test_implode_object_values() {
        let items = Value::from_json(&serde_json::json!({"a": "x", "b": "y"}));
        assert_eq!(
            implode(&[Value::string(","), items]).unwrap(),
            Value::string("x,y")
        );
    }

    #[test]
    fn test_implode_requires_array() {
        let err = implode(&[Value::string(","), Value::string("x")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "implode(): Argument #2 ($array) must be of type ?array, string given"
        );
    }

    #[test]
    fn test_implode_nested_array() {
        let items = Value::Array(vec![Value::Array(vec![])]);
        let err = implode(&[Value::string(","), items]).unwrap_err();
        assert_eq!(err.to_string(), "implode(): Array to string conversion");
    }
}
