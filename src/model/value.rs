//! Core value type produced by expression evaluation

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use super::types::TypeInfo;

/// Runtime value of an evaluated expression
///
/// Mirrors the JSON data model with two refinements: numbers are split into
/// integers and floats, and binary strings (raw digest output) are kept as
/// bytes so they survive until they are encoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Integer value (64-bit signed)
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// UTF-8 string value
    String(String),

    /// Binary string value
    Bytes(Vec<u8>),

    /// Ordered list of values
    Array(Vec<Value>),

    /// Object with insertion-ordered fields
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Create a string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Convert a decoded JSON value
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => Self::from_number(n),
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::Array(items.iter().map(Self::from_json).collect()),
            JsonValue::Object(fields) => Self::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert a JSON number, keeping integers that fit `i64`
    pub fn from_number(number: &JsonNumber) -> Self {
        match number.as_i64() {
            Some(i) => Self::Integer(i),
            None => Self::Float(number.as_f64().unwrap_or(f64::NAN)),
        }
    }

    /// Convert into a JSON value
    ///
    /// Bytes become a lossy UTF-8 string and non-finite floats become null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Integer(i) => JsonValue::Number((*i).into()),
            Self::Float(f) => JsonNumber::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
            Self::Array(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(fields) => {
                let mut map = JsonMap::with_capacity(fields.len());
                for (k, v) in fields {
                    map.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(map)
            }
        }
    }

    /// Compact JSON serialization, used to echo offending values in errors
    pub fn canonical_json(&self) -> String {
        self.to_json().to_string()
    }

    /// Check if this value is a scalar (anything except arrays and objects)
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Emptiness as used by `ifempty`
    ///
    /// Empty strings, `"0"`, null, false, numeric zero and empty containers
    /// are empty.
    pub fn is_empty_value(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Integer(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::String(s) => s.is_empty() || s == "0",
            Self::Bytes(b) => b.is_empty() || b.as_slice() == b"0",
            Self::Array(items) => items.is_empty(),
            Self::Object(fields) => fields.is_empty(),
        }
    }

    /// Coerce a scalar to its string form
    ///
    /// Returns `None` for arrays and objects, which have no string form.
    pub fn coerce_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => Some(Cow::Borrowed("")),
            Self::Bool(true) => Some(Cow::Borrowed("1")),
            Self::Bool(false) => Some(Cow::Borrowed("")),
            Self::Integer(i) => Some(Cow::Owned(i.to_string())),
            Self::Float(f) => Some(Cow::Owned(format_float(*f))),
            Self::String(s) => Some(Cow::Borrowed(s.as_str())),
            Self::Bytes(b) => Some(String::from_utf8_lossy(b)),
            Self::Array(_) | Self::Object(_) => None,
        }
    }

    /// Coerce a scalar to its byte string form
    pub fn coerce_bytes(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            Self::Bytes(b) => Some(Cow::Borrowed(b.as_slice())),
            Self::String(s) => Some(Cow::Borrowed(s.as_bytes())),
            other => other
                .coerce_string()
                .map(|s| Cow::Owned(s.into_owned().into_bytes())),
        }
    }

    /// Coerce to an integer the way numeric parameters are coerced
    ///
    /// Numeric strings are parsed, floats are truncated, booleans map to 0/1.
    pub fn coerce_integer(&self) -> Option<i64> {
        match self {
            Self::Null => Some(0),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Integer(i) => Some(*i),
            Self::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            Self::Bytes(b) => Self::String(String::from_utf8_lossy(b).into_owned()).coerce_integer(),
            Self::String(s) => parse_numeric_prefix(s).map(|n| match n {
                Value::Integer(i) => i,
                Value::Float(f) => f.trunc() as i64,
                _ => 0,
            }),
            _ => None,
        }
    }

    /// Coerce to a float
    pub fn coerce_float(&self) -> Option<f64> {
        match self {
            Self::Null => Some(0.0),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bytes(b) => Self::String(String::from_utf8_lossy(b).into_owned()).coerce_float(),
            Self::String(s) => parse_numeric_prefix(s).map(|n| match n {
                Value::Integer(i) => i as f64,
                Value::Float(f) => f,
                _ => 0.0,
            }),
            _ => None,
        }
    }

    /// Truthiness of a scalar flag argument
    pub fn is_truthy(&self) -> bool {
        !self.is_empty_value()
    }

    /// Type of this value for signature checks
    pub fn type_info(&self) -> TypeInfo {
        match self {
            Self::Null => TypeInfo::Null,
            Self::Bool(_) => TypeInfo::Boolean,
            Self::Integer(_) => TypeInfo::Integer,
            Self::Float(_) => TypeInfo::Float,
            Self::String(_) | Self::Bytes(_) => TypeInfo::String,
            Self::Array(_) => TypeInfo::Array,
            Self::Object(_) => TypeInfo::Object,
        }
    }

    /// Type name as reported by `gettype`
    pub fn gettype_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "double",
            Self::String(_) | Self::Bytes(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// Format a float the way the host runtime prints it
///
/// Values are rounded to 14 significant digits. Integral values print without
/// a fractional part, very large or very small magnitudes use `1.0E+25`
/// notation.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NAN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    // The exponent after rounding picks the notation
    let rounded = format!("{value:.prec$e}", prec = FLOAT_PRECISION - 1);
    let (mantissa, exponent) = rounded.split_once('e').unwrap_or((rounded.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if value != 0.0 && (exponent < -4 || exponent >= FLOAT_PRECISION as i32) {
        let mantissa = strip_fraction_zeros(mantissa);
        let mantissa = if mantissa.contains('.') {
            mantissa.to_string()
        } else {
            format!("{mantissa}.0")
        };
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{mantissa}E{sign}{}", exponent.abs());
    }

    let decimals = usize::try_from(FLOAT_PRECISION as i32 - 1 - exponent).unwrap_or(0);
    strip_fraction_zeros(&format!("{value:.decimals$}")).to_string()
}

/// Significant digits kept when a float becomes a string
const FLOAT_PRECISION: usize = 14;

fn strip_fraction_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Parse the leading numeric part of a string (`"12abc"` is 12)
///
/// Returns `None` when the string does not start with a number.
pub fn parse_numeric_prefix(input: &str) -> Option<Value> {
    let trimmed = input.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut is_float = false;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > end + 1 || end > digits_start {
            is_float = frac_end > end + 1;
            end = if is_float { frac_end } else { end };
        }
    }
    if end == digits_start {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
            is_float = true;
        }
    }
    let number = &trimmed[..end];
    if is_float {
        number.parse::<f64>().ok().map(Value::Float)
    } else {
        match number.parse::<i64>() {
            Ok(i) => Some(Value::Integer(i)),
            Err(_) => number.parse::<f64>().ok().map(Value::Float),
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        Self::from_json(json)
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Self::from_json(&json)
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Self::Float(_) => serializer.serialize_unit(),
            Self::String(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl fmt::Display for Value {
    /// Displays the compact JSON form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_json())
    }
}
