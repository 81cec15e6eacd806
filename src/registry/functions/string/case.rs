//! strtolower() and strtoupper() functions

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::string_arg;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// strtolower() function - ASCII lowercase
pub struct StrToLowerFunction;

impl HostFunction for StrToLowerFunction {
    fn name(&self) -> &str {
        "strtolower"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "strtolower",
                vec![ParameterInfo::required("string", TypeInfo::String)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the string with all ASCII letters converted to lowercase."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let input = string_arg(self.name(), args, 0, "string")?;
        Ok(Value::String(input.to_ascii_lowercase()))
    }
}

/// strtoupper() function - ASCII uppercase
pub struct StrToUpperFunction;

impl HostFunction for StrToUpperFunction {
    fn name(&self) -> &str {
        "strtoupper"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "strtoupper",
                vec![ParameterInfo::required("string", TypeInfo::String)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the string with all ASCII letters converted to uppercase."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let input = string_arg(self.name(), args, 0, "string")?;
        Ok(Value::String(input.to_ascii_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversion_is_ascii_only() {
        let context = FunctionContext::default();
        assert_eq!(
            StrToLowerFunction
                .evaluate(&[Value::string("GET Ünïcode")], &context)
                .unwrap(),
            Value::string("get Ünïcode")
        );
        assert_eq!(
            StrToUpperFunction
                .evaluate(&[Value::string("post")], &context)
                .unwrap(),
            Value::string("POST")
        );
    }
}
