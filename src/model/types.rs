//! Type system definitions for function signatures

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::Value;

/// Type information for values and function parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeInfo {
    /// Null value
    Null,
    /// Boolean value (true/false)
    Boolean,
    /// Integer numeric value
    Integer,
    /// Floating point numeric value
    Float,
    /// String value (text or binary)
    String,
    /// Ordered list
    Array,
    /// Object with named fields
    Object,
    /// Any type (used for polymorphic parameters)
    Any,
}

impl TypeInfo {
    /// Check if a value can be passed where this type is expected
    ///
    /// Parameters are coercive: scalars convert to strings and booleans,
    /// numeric strings convert to numbers. Containers only match their own
    /// type and `Any`.
    pub fn is_compatible_with(&self, value: &Value) -> bool {
        match self {
            TypeInfo::Any => true,
            TypeInfo::Null => value.is_null(),
            TypeInfo::String | TypeInfo::Boolean => value.is_scalar(),
            TypeInfo::Integer => value.coerce_integer().is_some(),
            TypeInfo::Float => value.coerce_float().is_some(),
            TypeInfo::Array => matches!(value, Value::Array(_)),
            TypeInfo::Object => matches!(value, Value::Object(_)),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeInfo::Null => "null",
            TypeInfo::Boolean => "bool",
            TypeInfo::Integer => "int",
            TypeInfo::Float => "float",
            TypeInfo::String => "string",
            TypeInfo::Array => "array",
            TypeInfo::Object => "object",
            TypeInfo::Any => "mixed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_parameters_accept_scalars_only() {
        assert!(TypeInfo::String.is_compatible_with(&Value::Integer(1)));
        assert!(TypeInfo::String.is_compatible_with(&Value::Null));
        assert!(!TypeInfo::String.is_compatible_with(&Value::Array(vec![])));
    }

    #[test]
    fn test_integer_parameters_accept_numeric_strings() {
        assert!(TypeInfo::Integer.is_compatible_with(&Value::string("1418031515")));
        assert!(!TypeInfo::Integer.is_compatible_with(&Value::string("soon")));
    }
}
