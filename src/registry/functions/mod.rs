//! Host function implementations
//!
//! The catalogue mirrors well-known host runtime functions so existing
//! configurations keep working: digests, date handling, string formatting and
//! a few conversion helpers.

pub mod conversion;
pub mod datetime;
pub mod digest;
pub mod string;

pub use conversion::*;
pub use datetime::*;
pub use digest::*;
pub use string::*;

use std::borrow::Cow;

use crate::model::Value;
use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult};

/// Register every catalogue function
pub fn register_standard_functions(registry: &mut FunctionRegistry) {
    digest::register_digest_functions(registry);
    datetime::register_datetime_functions(registry);
    string::register_string_functions(registry);
    conversion::register_conversion_functions(registry);
}

fn type_error(name: &str, index: usize, param: &str, expected: &str, actual: &Value) -> FunctionError {
    FunctionError::InvalidArgumentType {
        name: name.to_string(),
        index,
        param: param.to_string(),
        expected: expected.to_string(),
        actual: actual.type_info().to_string(),
    }
}

/// Required string argument
pub(crate) fn string_arg<'a>(
    name: &str,
    args: &'a [Value],
    index: usize,
    param: &str,
) -> FunctionResult<Cow<'a, str>> {
    let value = args.get(index).unwrap_or(&Value::Null);
    value
        .coerce_string()
        .ok_or_else(|| type_error(name, index, param, "string", value))
}

/// Required binary-safe string argument
pub(crate) fn bytes_arg<'a>(
    name: &str,
    args: &'a [Value],
    index: usize,
    param: &str,
) -> FunctionResult<Cow<'a, [u8]>> {
    let value = args.get(index).unwrap_or(&Value::Null);
    value
        .coerce_bytes()
        .ok_or_else(|| type_error(name, index, param, "string", value))
}

/// Optional integer argument; `None` when absent or null
pub(crate) fn optional_int_arg(
    name: &str,
    args: &[Value],
    index: usize,
    param: &str,
) -> FunctionResult<Option<i64>> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .coerce_integer()
            .map(Some)
            .ok_or_else(|| type_error(name, index, param, "?int", value)),
    }
}

/// Optional boolean flag, false when absent
pub(crate) fn flag_arg(args: &[Value], index: usize) -> bool {
    args.get(index).is_some_and(Value::is_truthy)
}

/// Coerce a list element for joining
pub(crate) fn join_element<'a>(name: &str, value: &'a Value) -> FunctionResult<Cow<'a, str>> {
    value
        .coerce_string()
        .ok_or_else(|| FunctionError::evaluation(name, "Array to string conversion"))
}
