//! strval() function - string form of a scalar

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::join_element;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// strval() function - string form of a scalar
pub struct StrvalFunction;

impl HostFunction for StrvalFunction {
    fn name(&self) -> &str {
        "strval"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "strval",
                vec![ParameterInfo::required("value", TypeInfo::Any)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the string value of a scalar."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        match &args[0] {
            Value::Bytes(bytes) => Ok(Value::Bytes(bytes.clone())),
            value => Ok(Value::String(join_element(self.name(), value)?.into_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strval() {
        let context = FunctionContext::default();
        assert_eq!(
            StrvalFunction.evaluate(&[Value::Integer(42)], &context).unwrap(),
            Value::string("42")
        );
        assert_eq!(
            StrvalFunction.evaluate(&[Value::Float(0.5)], &context).unwrap(),
            Value::string("0.5")
        );
        assert_eq!(
            StrvalFunction.evaluate(&[Value::Bool(true)], &context).unwrap(),
            Value::string("1")
        );
    }

    #[test]
    fn test_strval_rejects_arrays() {
        let err = StrvalFunction
            .evaluate(&[Value::Array(vec![])], &FunctionContext::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "strval(): Array to string conversion");
    }
}
