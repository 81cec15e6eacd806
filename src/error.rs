// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for expression evaluation
//!
//! Every failure the evaluator reports is caused by the user supplied
//! expression or parameters, so all of them share one public error type.
//! Host functions report their own [`FunctionError`](crate::registry::FunctionError),
//! which the evaluator re-wraps as [`EvaluationError::FunctionFailure`].

use thiserror::Error;

use crate::registry::FunctionError;

/// Result type alias for evaluation operations
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Status code reported for user script errors
pub const USER_ERROR_STATUS: u16 = 400;

/// Discriminant of an [`EvaluationError`], useful for matching without payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Function name not allowed, or not a plain string
    IllegalFunction,
    /// Parameter reference whose key is not a scalar
    InvalidReference,
    /// Parameter namespace or key is missing
    ReferenceNotFound,
    /// Internal function called with the wrong number of arguments
    BadArgumentCount,
    /// Parameter namespace whose table is not a map
    MalformedParameterTable,
    /// Failure raised inside a host or internal function
    FunctionFailure,
    /// Function `args` field that is not a list
    InvalidArguments,
    /// Expression tree nested deeper than the configured limit
    RecursionLimitExceeded,
}

/// Errors produced while evaluating a user expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// The function is not in the allowlist, or its name is not a string
    #[error("Illegal function '{name}'!")]
    IllegalFunction {
        /// Function name, or canonical JSON of the offending value
        name: String,
    },

    /// A parameter reference points at a non-scalar key
    #[error("Error evaluating user function - {namespace} '{reference}' is not a string!")]
    InvalidReference {
        /// Namespace of the reference
        namespace: String,
        /// Canonical JSON of the offending key
        reference: String,
    },

    /// The referenced namespace or key does not exist
    #[error("Error evaluating user function - {namespace} '{key}' not found!")]
    ReferenceNotFound {
        /// Namespace of the reference
        namespace: String,
        /// Key as written in the expression
        key: String,
    },

    /// An internal function was called with the wrong arity
    #[error("Bad argument count for function '{name}'!")]
    BadArgumentCount {
        /// Function name
        name: String,
    },

    /// A parameter namespace does not hold a map
    #[error("The params for code builder must be an array of arrays!")]
    MalformedParameterTable {
        /// Offending namespace (empty when the whole parameter set is malformed)
        namespace: String,
    },

    /// A host or internal function failed; the message is preserved verbatim
    #[error("{message}")]
    FunctionFailure {
        /// Function that failed
        name: String,
        /// Underlying error message
        message: String,
    },

    /// A function call carries an `args` field that is not a list
    #[error("Arguments of function '{name}' must be an array!")]
    InvalidArguments {
        /// Function name
        name: String,
    },

    /// The expression tree nests deeper than allowed
    #[error("Expression nesting exceeds the maximum depth of {limit}!")]
    RecursionLimitExceeded {
        /// Configured depth limit
        limit: usize,
    },
}

impl EvaluationError {
    /// Create an illegal function error
    pub fn illegal_function(name: impl Into<String>) -> Self {
        Self::IllegalFunction { name: name.into() }
    }

    /// Create a reference not found error
    pub fn reference_not_found(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Wrap a host function error
    pub fn function_failure(name: impl Into<String>, error: &FunctionError) -> Self {
        Self::FunctionFailure {
            name: name.into(),
            message: error.to_string(),
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IllegalFunction { .. } => ErrorKind::IllegalFunction,
            Self::InvalidReference { .. } => ErrorKind::InvalidReference,
            Self::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            Self::BadArgumentCount { .. } => ErrorKind::BadArgumentCount,
            Self::MalformedParameterTable { .. } => ErrorKind::MalformedParameterTable,
            Self::FunctionFailure { .. } => ErrorKind::FunctionFailure,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::RecursionLimitExceeded { .. } => ErrorKind::RecursionLimitExceeded,
        }
    }

    /// Whether the error was caused by user input rather than the engine
    pub fn is_user_error(&self) -> bool {
        true
    }

    /// Status code suitable for reporting the error to API clients
    pub fn status_code(&self) -> u16 {
        USER_ERROR_STATUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_not_found_message() {
        let err = EvaluationError::reference_not_found("attr", "k");
        assert_eq!(
            err.to_string(),
            "Error evaluating user function - attr 'k' not found!"
        );
        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    }

    #[test]
    fn test_function_failure_keeps_message() {
        let inner = FunctionError::EvaluationError {
            name: "date".to_string(),
            message: "boom".to_string(),
        };
        let err = EvaluationError::function_failure("date", &inner);
        assert_eq!(err.to_string(), "date(): boom");
        assert_eq!(err.kind(), ErrorKind::FunctionFailure);
        assert!(err.is_user_error());
        assert_eq!(err.status_code(), 400);
    }
}
