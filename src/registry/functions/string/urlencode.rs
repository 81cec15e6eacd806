//! urlencode() function - form-style URL encoding

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::bytes_arg;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// Everything except alphanumerics and `-_.` is escaped
const FORM_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// urlencode() function - spaces become `+`
pub struct UrlEncodeFunction;

impl HostFunction for UrlEncodeFunction {
    fn name(&self) -> &str {
        "urlencode"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "urlencode",
                vec![ParameterInfo::required("string", TypeInfo::String)],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "URL-encodes a string the way HTML forms are encoded: spaces as plus signs, \
         other non-alphanumeric characters except -_. as %XX."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let data = bytes_arg(self.name(), args, 0, "string")?;
        let encoded = data
            .split(|b| *b == b' ')
            .map(|segment| percent_encode(segment, FORM_ENCODE_SET).to_string())
            .collect::<Vec<_>>()
            .join("+");
        Ok(Value::String(encoded))
    }
}
