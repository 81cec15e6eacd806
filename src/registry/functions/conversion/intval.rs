//! intval() function - integer value of a variable

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionError, FunctionResult, HostFunction};
use crate::registry::functions::optional_int_arg;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// intval() function - integer value, optionally parsing a string in another base
pub struct IntvalFunction;

impl HostFunction for IntvalFunction {
    fn name(&self) -> &str {
        "intval"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "intval",
                vec![
                    ParameterInfo::required("value", TypeInfo::Any),
                    ParameterInfo::optional("base", TypeInfo::Integer),
                ],
                TypeInfo::Integer,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the integer value of a variable. Strings are parsed in the given base \
         (default 10, 0 detects 0x, 0b and 0 prefixes); unparseable strings give 0."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let base = optional_int_arg(self.name(), args, 1, "base")?.unwrap_or(10);
        if base != 0 && !(2..=36).contains(&base) {
            return Err(FunctionError::evaluation(
                self.name(),
                "Argument #2 ($base) must be between 2 and 36 (inclusive), or 0",
            ));
        }

        let result = match &args[0] {
            Value::Array(items) => i64::from(!items.is_empty()),
            Value::Object(fields) => i64::from(!fields.is_empty()),
            Value::String(s) if base != 10 => parse_radix(s, base as u32),
            Value::Bytes(b) if base != 10 => parse_radix(&String::from_utf8_lossy(b), base as u32),
            value => value.coerce_integer().unwrap_or(0),
        };
        Ok(Value::Integer(result))
    }
}

/// Parse the leading digits of `input` in `base`, saturating on overflow
///
/// Base 0 picks the base from a `0x`, `0b`, `0o` or `0` prefix.
fn parse_radix(input: &str, base: u32) -> i64 {
    let trimmed = input.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = unsigned.to_ascii_lowercase();
    let (base, digits) = match base {
        0 if lower.starts_with("0x") => (16, &unsigned[2..]),
        0 if lower.starts_with("0b") => (2, &unsigned[2..]),
        0 if lower.starts_with("0o") => (8, &unsigned[2..]),
        0 if lower.starts_with('0') => (8, &unsigned[1..]),
        0 => (10, unsigned),
        16 if lower.starts_with("0x") => (16, &unsigned[2..]),
        8 if lower.starts_with("0o") => (8, &unsigned[2..]),
        2 if lower.starts_with("0b") => (2, &unsigned[2..]),
        _ => (base, unsigned),
    };

    let mut value: i64 = 0;
    for digit in digits.chars().map_while(|c| c.to_digit(base)) {
        value = match value
            .checked_mul(i64::from(base))
            .and_then(|v| v.checked_add(i64::from(digit)))
        {
            Some(v) => v,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }
    if negative { -value } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn intval(args: &[Value]) -> Value {
        IntvalFunction
            .evaluate(args, &FunctionContext::default())
            .unwrap()
    }

    #[rstest]
    #[case(Value::string("1234"), 1234)]
    #[case(Value::string("12abc"), 12)]
    #[case(Value::string("abc"), 0)]
    #[case(Value::Float(4.7), 4)]
    #[case(Value::Bool(true), 1)]
    #[case(Value::Null, 0)]
    #[case(Value::Array(vec![Value::Null]), 1)]
    fn test_intval_default_base(#[case] value: Value, #[case] expected: i64) {
        assert_eq!(intval(&[value]), Value::Integer(expected));
    }

    #[rstest]
    #[case("ff", 16, 255)]
    #[case("0x1A", 16, 26)]
    #[case("0x1A", 0, 26)]
    #[case("042", 0, 34)]
    #[case("101", 2, 5)]
    #[case("-z", 36, -35)]
    fn test_intval_with_base(#[case] input: &str, #[case] base: i64, #[case] expected: i64) {
        assert_eq!(
            intval(&[Value::string(input), Value::Integer(base)]),
            Value::Integer(expected)
        );
    }

    #[test]
    fn test_intval_invalid_base() {
        let err = IntvalFunction
            .evaluate(
                &[Value::string("1"), Value::Integer(1)],
                &FunctionContext::default(),
            )
            .unwrap_err();
        assert!(err.to_string().starts_with("intval(): Argument #2 ($base)"));
    }
}
