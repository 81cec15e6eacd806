//! Function signatures for argument validation

use crate::model::TypeInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Function signature used to check arity and argument types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Parameter types
    pub parameters: Vec<ParameterInfo>,
    /// Return type
    pub return_type: TypeInfo,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub param_type: TypeInfo,
    /// Whether this parameter is optional
    pub optional: bool,
}

impl FunctionSignature {
    /// Create a new function signature
    ///
    /// Optional parameters must come after the required ones.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: TypeInfo,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();
        let max_arity = Some(parameters.len());

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity,
        }
    }

    /// Create a variadic function signature
    ///
    /// The last parameter describes every trailing argument.
    pub fn variadic(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: TypeInfo,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity: None,
        }
    }

    /// Parameter describing the argument at `index`
    pub fn parameter(&self, index: usize) -> Option<&ParameterInfo> {
        match self.parameters.get(index) {
            Some(param) => Some(param),
            None if self.max_arity.is_none() => self.parameters.last(),
            None => None,
        }
    }

    /// Check if `count` arguments are accepted
    pub fn accepts_arity(&self, count: usize) -> bool {
        count >= self.min_arity && self.max_arity.is_none_or(|max| count <= max)
    }
}

impl ParameterInfo {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, param_type: TypeInfo) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(name: impl Into<String>, param_type: TypeInfo) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: true,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if param.optional {
                write!(f, "[{} ${}]", param.param_type, param.name)?;
            } else {
                write!(f, "{} ${}", param.param_type, param.name)?;
            }
        }
        if self.max_arity.is_none() {
            write!(f, ", ...")?;
        }
        write!(f, "): {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_signature_arity() {
        let sig = FunctionSignature::new(
            "date",
            vec![
                ParameterInfo::required("format", TypeInfo::String),
                ParameterInfo::optional("timestamp", TypeInfo::Integer),
            ],
            TypeInfo::String,
        );

        assert_eq!(sig.min_arity, 1);
        assert_eq!(sig.max_arity, Some(2));
        assert!(!sig.accepts_arity(0));
        assert!(sig.accepts_arity(2));
        assert!(!sig.accepts_arity(3));
        assert_eq!(sig.to_string(), "date(string $format, [int $timestamp]): string");
    }

    #[test]
    fn test_variadic_signature_repeats_last_parameter() {
        let sig = FunctionSignature::variadic(
            "sprintf",
            vec![
                ParameterInfo::required("format", TypeInfo::String),
                ParameterInfo::optional("values", TypeInfo::Any),
            ],
            TypeInfo::String,
        );

        assert!(sig.accepts_arity(10));
        assert_eq!(sig.parameter(7).map(|p| p.name.as_str()), Some("values"));
        assert_eq!(sig.to_string(), "sprintf(string $format, [mixed $values], ...): string");
    }

    #[test]
    fn test_no_parameters() {
        let sig = FunctionSignature::new("time", vec![], TypeInfo::Integer);
        assert_eq!(sig.max_arity, Some(0));
        assert!(sig.accepts_arity(0));
        assert!(!sig.accepts_arity(1));
    }
}
