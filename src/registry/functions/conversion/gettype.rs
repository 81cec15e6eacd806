//! gettype() function - names the type of a value

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// gettype() function - names the type of a value
pub struct GetTypeFunction;

impl HostFunction for GetTypeFunction {
    fn name(&self) -> &str {
        "gettype"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "gettype",
                vec![ParameterInfo::required("value", TypeInfo::Any)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the type name of a value: boolean, integer, double, string, array, object or NULL."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        Ok(Value::string(args[0].gettype_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Integer(1), "integer")]
    #[case(Value::Float(1.5), "double")]
    #[case(Value::string("1"), "string")]
    #[case(Value::Bool(false), "boolean")]
    #[case(Value::Null, "NULL")]
    #[case(Value::Array(vec![]), "array")]
    fn test_gettype(#[case] value: Value, #[case] expected: &str) {
        let result = GetTypeFunction
            .evaluate(&[value], &FunctionContext::default())
            .unwrap();
        assert_eq!(result, Value::string(expected));
    }
}
