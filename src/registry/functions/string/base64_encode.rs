//! base64_encode() function - encodes binary-safe strings

use base64::{Engine, engine::general_purpose};

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::bytes_arg;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// base64_encode() function - standard alphabet with padding
pub struct Base64EncodeFunction;

impl HostFunction for Base64EncodeFunction {
    fn name(&self) -> &str {
        "base64_encode"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "base64_encode",
                vec![ParameterInfo::required("string", TypeInfo::String)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Encodes data with MIME base64. Raw digest output is encoded byte for byte."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let data = bytes_arg(self.name(), args, 0, "string")?;
        Ok(Value::String(general_purpose::STANDARD.encode(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_text() {
        let result = Base64EncodeFunction
            .evaluate(&[Value::string("Hello, World!")], &FunctionContext::default())
            .unwrap();
        assert_eq!(result, Value::string("SGVsbG8sIFdvcmxkIQ=="));
    }

    #[test]
    fn test_encode_bytes() {
        let result = Base64EncodeFunction
            .evaluate(&[Value::Bytes(vec![0xff, 0x00, 0xfe])], &FunctionContext::default())
            .unwrap();
        assert_eq!(result, Value::string("/wD+"));
    }

    #[test]
    fn test_encode_empty() {
        let result = Base64EncodeFunction
            .evaluate(&[Value::string("")], &FunctionContext::default())
            .unwrap();
        assert_eq!(result, Value::string(""));
    }
}
