//! sprintf() function - printf-style formatting

use std::iter::Peekable;
use std::str::Chars;

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionError, FunctionResult, HostFunction};
use crate::registry::functions::{join_element, string_arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

const DEFAULT_PRECISION: usize = 6;

/// Largest float precision the host runtime honours
const MAX_FLOAT_PRECISION: usize = 53;

/// Upper bound for argnum, width and precision
const MAX_SPECIFIER_NUMBER: usize = i32::MAX as usize;

/// Upper bound for the formatted result, in bytes
const MAX_OUTPUT_LEN: usize = 1 << 20;

/// sprintf() function - returns a formatted string
pub struct SprintfFunction;

impl HostFunction for SprintfFunction {
    fn name(&self) -> &str {
        "sprintf"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::variadic(
                "sprintf",
                vec![
                    ParameterInfo::required("format", TypeInfo::String),
                    ParameterInfo::optional("values", TypeInfo::Any),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns a string produced according to the format string. Conversions follow \
         %[argnum$][flags][width][.precision]specifier with specifiers b, c, d, e, E, f, F, \
         g, G, o, s, u, x, X and %."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let format = string_arg(self.name(), args, 0, "format")?;
        format_printf(self.name(), &format, &args[1..])
    }
}

/// Format `values` according to a printf-style `format`
///
/// `name` prefixes error messages. The result is a string unless `%c`
/// produced bytes that are not valid UTF-8, in which case it is
/// [`Value::Bytes`].
pub fn format_printf(name: &str, format: &str, values: &[Value]) -> FunctionResult<Value> {
    let mut out = Vec::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            push_char(&mut out, c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push(b'%');
            continue;
        }

        let spec = Conversion::parse(&mut chars).map_err(|msg| FunctionError::evaluation(name, msg))?;
        let index = match spec.argnum {
            Some(argnum) => argnum - 1,
            None => {
                next_arg += 1;
                next_arg - 1
            }
        };
        let value = values.get(index).ok_or_else(|| {
            FunctionError::evaluation(
                name,
                format!(
                    "{} arguments are required, {} given",
                    index + 2,
                    values.len() + 1
                ),
            )
        })?;
        spec.render(name, value, &mut out)?;
    }

    Ok(match String::from_utf8(out) {
        Ok(text) => Value::String(text),
        Err(e) => Value::Bytes(e.into_bytes()),
    })
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Integer form of a conversion argument; non-numeric strings are 0
fn integer_operand(value: &Value) -> i64 {
    match value {
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(fields) => i64::from(!fields.is_empty()),
        other => other.coerce_integer().unwrap_or(0),
    }
}

/// Float form of a conversion argument; non-numeric strings are 0.0
fn float_operand(value: &Value) -> f64 {
    match value {
        Value::Array(items) => f64::from(u8::from(!items.is_empty())),
        Value::Object(fields) => f64::from(u8::from(!fields.is_empty())),
        other => other.coerce_float().unwrap_or(0.0),
    }
}

/// One parsed `%...` conversion
#[derive(Debug, Clone, PartialEq)]
struct Conversion {
    argnum: Option<usize>,
    left_align: bool,
    plus_sign: bool,
    pad: char,
    width: usize,
    precision: Option<usize>,
    specifier: char,
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        chars.next();
        number = Some(
            number
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(digit as usize),
        );
    }
    number
}

impl Conversion {
    fn parse(chars: &mut Peekable<Chars<'_>>) -> Result<Self, String> {
        let mut spec = Self {
            argnum: None,
            left_align: false,
            plus_sign: false,
            pad: ' ',
            width: 0,
            precision: None,
            specifier: 's',
        };

        let mut lookahead = chars.clone();
        if let Some(argnum) = take_number(&mut lookahead) {
            if lookahead.peek() == Some(&'$') {
                lookahead.next();
                if argnum == 0 || argnum > MAX_SPECIFIER_NUMBER {
                    return Err(
                        "Argument number specifier must be greater than zero and less than 2147483647"
                            .to_string(),
                    );
                }
                spec.argnum = Some(argnum);
                *chars = lookahead;
            }
        }

        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => spec.left_align = true,
                '+' => spec.plus_sign = true,
                '0' | ' ' => spec.pad = flag,
                '\'' => {
                    chars.next();
                    spec.pad = chars
                        .peek()
                        .copied()
                        .ok_or_else(|| "Missing padding character".to_string())?;
                }
                _ => break,
            }
            chars.next();
        }

        spec.width = take_number(chars).unwrap_or(0);
        if spec.width > MAX_SPECIFIER_NUMBER {
            return Err("Width must be greater than zero and less than 2147483647".to_string());
        }
        if chars.peek() == Some(&'.') {
            chars.next();
            let precision = take_number(chars).unwrap_or(0);
            if precision > MAX_SPECIFIER_NUMBER {
                return Err(
                    "Precision must be greater than zero and less than 2147483647".to_string(),
                );
            }
            spec.precision = Some(precision);
        }

        spec.specifier = chars
            .next()
            .ok_or_else(|| "Missing format specifier at end of string".to_string())?;
        Ok(spec)
    }

    fn render(&self, name: &str, value: &Value, out: &mut Vec<u8>) -> FunctionResult<()> {
        match self.specifier {
            's' => {
                let text = join_element(name, value)?;
                let text: String = match self.precision {
                    Some(limit) => text.chars().take(limit).collect(),
                    None => text.into_owned(),
                };
                self.pad_into(name, out, "", &text)?;
            }
            'd' => {
                let n = integer_operand(value);
                let sign = if n < 0 {
                    "-"
                } else if self.plus_sign {
                    "+"
                } else {
                    ""
                };
                self.pad_into(name, out, sign, &n.unsigned_abs().to_string())?;
            }
            'u' => {
                let n = integer_operand(value);
                self.pad_into(name, out, "", &(n as u64).to_string())?;
            }
            'b' | 'o' | 'x' | 'X' => {
                let n = integer_operand(value) as u64;
                let digits = match self.specifier {
                    'b' => format!("{n:b}"),
                    'o' => format!("{n:o}"),
                    'x' => format!("{n:x}"),
                    _ => format!("{n:X}"),
                };
                self.pad_into(name, out, "", &digits)?;
            }
            'c' => out.push(integer_operand(value) as u8),
            'e' | 'E' | 'f' | 'F' | 'g' | 'G' => {
                let f = float_operand(value);
                let sign = if f.is_sign_negative() && f != 0.0 {
                    "-"
                } else if self.plus_sign {
                    "+"
                } else {
                    ""
                };
                let precision = self
                    .precision
                    .unwrap_or(DEFAULT_PRECISION)
                    .min(MAX_FLOAT_PRECISION);
                let magnitude = f.abs();
                let digits = match self.specifier {
                    'e' | 'E' => format_exponent(magnitude, precision, self.specifier == 'E'),
                    'f' | 'F' => format!("{magnitude:.precision$}"),
                    _ => format_general(magnitude, precision, self.specifier == 'G'),
                };
                self.pad_into(name, out, sign, &digits)?;
            }
            other => {
                return Err(FunctionError::evaluation(
                    name,
                    format!("Unknown format specifier \"{other}\""),
                ));
            }
        }
        Ok(())
    }

    /// Pad `sign` + `digits` to the field width
    ///
    /// Zero padding goes between the sign and the digits.
    fn pad_into(&self, name: &str, out: &mut Vec<u8>, sign: &str, digits: &str) -> FunctionResult<()> {
        let len = sign.chars().count() + digits.chars().count();
        let fill_len = self.width.saturating_sub(len);
        let total = out.len() + sign.len() + digits.len() + fill_len * self.pad.len_utf8();
        if total > MAX_OUTPUT_LEN {
            return Err(FunctionError::evaluation(
                name,
                format!("Result exceeds the maximum length of {MAX_OUTPUT_LEN} bytes"),
            ));
        }

        let fill: String = std::iter::repeat_n(self.pad, fill_len).collect();
        let parts = if self.left_align {
            [sign, digits, fill.as_str()]
        } else if self.pad == '0' {
            [sign, fill.as_str(), digits]
        } else {
            [fill.as_str(), sign, digits]
        };
        for part in parts {
            out.extend_from_slice(part.as_bytes());
        }
        Ok(())
    }
}

/// Scientific notation with an unpadded signed exponent (`1.5e+3`)
fn format_exponent(value: f64, precision: usize, upper: bool) -> String {
    let formatted = format!("{value:.precision$e}");
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let e = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}{e}{sign}{}", exponent.abs())
}

/// Shorter of fixed and scientific notation, trailing zeros removed
fn format_general(value: f64, precision: usize, upper: bool) -> String {
    let precision = precision.max(1);
    if value == 0.0 {
        return "0".to_string();
    }
    let exponent = value.log10().floor() as i64;
    if exponent < -4 || exponent >= precision as i64 {
        let formatted = format_exponent(value, precision - 1, upper);
        let split_at = formatted.find(['e', 'E']).unwrap_or(formatted.len());
        let (mantissa, exponent) = formatted.split_at(split_at);
        format!("{}{exponent}", strip_fraction_zeros(mantissa))
    } else {
        let decimals = usize::try_from(precision as i64 - 1 - exponent).unwrap_or(0);
        strip_fraction_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

fn strip_fraction_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sprintf(format: &str, values: &[Value]) -> String {
        match format_printf("sprintf", format, values).unwrap() {
            Value::String(text) => text,
            other => panic!("expected a string, got {other:?}"),
        }
    }

    fn sprintf_error(format: &str, values: &[Value]) -> String {
        format_printf("sprintf", format, values).unwrap_err().to_string()
    }

    #[rstest]
    #[case("%s-%s", vec![Value::string("a"), Value::Integer(1)], "a-1")]
    #[case("%05d", vec![Value::Integer(-42)], "-0042")]
    #[case("%+d", vec![Value::Integer(7)], "+7")]
    #[case("%5s|%-5s|", vec![Value::string("ab"), Value::string("cd")], "   ab|cd   |")]
    #[case("%'*8s", vec![Value::string("pad")], "*****pad")]
    #[case("%.2f", vec![Value::Float(3.14159)], "3.14")]
    #[case("%08.3f", vec![Value::Float(-3.14159)], "-003.142")]
    #[case("%x %X %o %b", vec![Value::Integer(255), Value::Integer(255), Value::Integer(8), Value::Integer(5)], "ff FF 10 101")]
    #[case("%e", vec![Value::Float(1234.5)], "1.234500e+3")]
    #[case("%.1E", vec![Value::Float(0.00012)], "1.2E-4")]
    #[case("%g", vec![Value::Float(0.5)], "0.5")]
    #[case("%g", vec![Value::Float(1e25)], "1e+25")]
    #[case("%G", vec![Value::Float(123456789.0)], "1.23457E+8")]
    #[case("%c%c", vec![Value::Integer(79), Value::Integer(75)], "OK")]
    #[case("%u", vec![Value::Integer(-1)], "18446744073709551615")]
    #[case("%.3s", vec![Value::string("abcdef")], "abc")]
    #[case("100%%", vec![], "100%")]
    #[case("%2$s %1$s", vec![Value::string("world"), Value::string("hello")], "hello world")]
    #[case("%d", vec![Value::string("12abc")], "12")]
    #[case("%d", vec![Value::string("abc")], "0")]
    #[case("%.2f", vec![Value::string("x")], "0.00")]
    #[case("%x|%e", vec![Value::string(""), Value::string("n/a")], "0|0.000000e+0")]
    #[case("%d", vec![Value::Array(vec![Value::Integer(5)])], "1")]
    fn test_sprintf_conversions(
        #[case] format: &str,
        #[case] values: Vec<Value>,
        #[case] expected: &str,
    ) {
        assert_eq!(sprintf(format, &values), expected);
    }

    #[test]
    fn test_too_few_arguments() {
        let err = format_printf("sprintf", "%s %s", &[Value::string("a")]).unwrap_err();
        assert_eq!(err.to_string(), "sprintf(): 3 arguments are required, 2 given");
    }

    #[test]
    fn test_unknown_specifier() {
        let err = format_printf("sprintf", "%y", &[Value::Integer(1)]).unwrap_err();
        assert_eq!(err.to_string(), "sprintf(): Unknown format specifier \"y\"");
    }

    #[test]
    fn test_missing_specifier() {
        let err = format_printf("sprintf", "abc %", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sprintf(): Missing format specifier at end of string"
        );
    }

    #[test]
    fn test_function_requires_format() {
        let err = SprintfFunction
            .evaluate(&[], &FunctionContext::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "sprintf() expects at least 1 parameter, 0 given");
    }

    #[test]
    fn test_argnum_out_of_range() {
        assert_eq!(
            sprintf_error("%99999999999999999999999$s", &[Value::string("a")]),
            "sprintf(): Argument number specifier must be greater than zero and less than 2147483647"
        );
        assert_eq!(
            sprintf_error("%2147483648$s", &[Value::string("a")]),
            "sprintf(): Argument number specifier must be greater than zero and less than 2147483647"
        );
    }

    #[test]
    fn test_large_argnum_within_range_reports_missing_arguments() {
        assert_eq!(
            sprintf_error("%2147483647$s", &[Value::string("a")]),
            "sprintf(): 2147483648 arguments are required, 2 given"
        );
    }

    #[test]
    fn test_width_out_of_range() {
        assert_eq!(
            sprintf_error("%99999999999999999999s", &[Value::string("a")]),
            "sprintf(): Width must be greater than zero and less than 2147483647"
        );
    }

    #[test]
    fn test_padding_is_capped() {
        let err = sprintf_error("%2000000000s", &[Value::string("a")]);
        assert!(err.contains("exceeds the maximum length"), "{err}");

        let err = sprintf_error("%600000s%600000s", &[Value::string("a"), Value::string("b")]);
        assert!(err.contains("exceeds the maximum length"), "{err}");

        assert_eq!(sprintf("%1000s", &[Value::string("a")]).len(), 1000);
    }

    #[test]
    fn test_float_precision_is_clamped() {
        let clamped = sprintf("%.70000f", &[Value::Integer(1)]);
        assert_eq!(clamped, format!("1.{}", "0".repeat(MAX_FLOAT_PRECISION)));
        assert_eq!(sprintf("%.100e", &[Value::Integer(1)]), format!("1.{}e+0", "0".repeat(53)));
        assert_eq!(sprintf("%.99999g", &[Value::Float(0.5)]), "0.5");
    }

    #[test]
    fn test_precision_out_of_range() {
        assert_eq!(
            sprintf_error("%.99999999999f", &[Value::Integer(1)]),
            "sprintf(): Precision must be greater than zero and less than 2147483647"
        );
    }

    #[test]
    fn test_char_above_ascii_is_a_raw_byte() {
        let result = format_printf("sprintf", "%c", &[Value::Integer(233)]).unwrap();
        assert_eq!(result, Value::Bytes(vec![233]));

        let result = format_printf("sprintf", "a%cb", &[Value::Integer(65)]).unwrap();
        assert_eq!(result, Value::string("aAb"));
    }
}
