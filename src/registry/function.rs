//! Host function trait, registry and call context

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::model::Value;
use crate::registry::signature::FunctionSignature;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
///
/// Messages follow the wording of the host runtime the catalogue mirrors, so
/// configuration authors see familiar diagnostics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("{}", arity_message(name, *min, *max, *actual))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// Invalid argument type
    #[error("{name}(): Argument #{} (${param}) must be of type {expected}, {actual} given", index + 1)]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index (0-based)
        index: usize,
        /// Parameter name
        param: String,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Runtime evaluation error
    #[error("{name}(): {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },

    /// The function does not exist in the catalogue
    #[error("Call to undefined function {name}()")]
    UndefinedFunction {
        /// Function name
        name: String,
    },
}

fn arity_message(name: &str, min: usize, max: Option<usize>, actual: usize) -> String {
    let (qualifier, expected) = if actual < min {
        (if max == Some(min) { "exactly" } else { "at least" }, min)
    } else {
        let max = max.unwrap_or(actual);
        (if max == min { "exactly" } else { "at most" }, max)
    };
    let noun = if expected == 1 { "parameter" } else { "parameters" };
    format!("{name}() expects {qualifier} {expected} {noun}, {actual} given")
}

impl FunctionError {
    /// Create a runtime evaluation error
    pub fn evaluation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EvaluationError {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Context handed to every host function call
#[derive(Debug, Clone)]
pub struct FunctionContext {
    /// Offset used to interpret and format local dates
    pub timezone: FixedOffset,
    /// Fixed "current time"; the system clock is read when unset
    pub frozen_time: Option<DateTime<Utc>>,
}

impl FunctionContext {
    /// Create a context in the given timezone
    pub fn new(timezone: FixedOffset) -> Self {
        Self {
            timezone,
            frozen_time: None,
        }
    }

    /// Pin the current time
    pub fn with_frozen_time(mut self, now: DateTime<Utc>) -> Self {
        self.frozen_time = Some(now);
        self
    }

    /// Current time
    pub fn now(&self) -> DateTime<Utc> {
        self.frozen_time.unwrap_or_else(Utc::now)
    }
}

impl Default for FunctionContext {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}

/// Trait for implementing host functions
pub trait HostFunction: Send + Sync {
    /// Get the function name
    fn name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate the function with given arguments
    fn evaluate(&self, args: &[Value], context: &FunctionContext) -> FunctionResult<Value>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Check if this function is pure (deterministic with no side effects)
    fn is_pure(&self) -> bool {
        false
    }

    /// Validate arguments before evaluation (both arity and types)
    fn validate_args(&self, args: &[Value]) -> FunctionResult<()> {
        let sig = self.signature();

        if !sig.accepts_arity(args.len()) {
            return Err(FunctionError::InvalidArity {
                name: self.name().to_string(),
                min: sig.min_arity,
                max: sig.max_arity,
                actual: args.len(),
            });
        }

        for (i, arg) in args.iter().enumerate() {
            if let Some(param) = sig.parameter(i) {
                if !param.param_type.is_compatible_with(arg) {
                    return Err(FunctionError::InvalidArgumentType {
                        name: self.name().to_string(),
                        index: i,
                        param: param.name.clone(),
                        expected: param.param_type.to_string(),
                        actual: arg.type_info().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Capability resolving host functions by name
///
/// The evaluator only talks to this trait, so the catalogue can be swapped
/// for a custom or mocked one.
pub trait HostFunctions: Send + Sync {
    /// Invoke the named function with positional arguments
    fn invoke(&self, name: &str, args: &[Value], context: &FunctionContext)
    -> FunctionResult<Value>;

    /// Check if the named function exists
    fn contains(&self, name: &str) -> bool;
}

type ClosureFn = dyn Fn(&[Value], &FunctionContext) -> FunctionResult<Value> + Send + Sync;

/// Host function backed by a closure
pub struct ClosureFunction {
    signature: FunctionSignature,
    documentation: String,
    func: Box<ClosureFn>,
}

impl ClosureFunction {
    /// Wrap a closure with its signature
    pub fn new<F>(signature: FunctionSignature, documentation: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value], &FunctionContext) -> FunctionResult<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            documentation: documentation.into(),
            func: Box::new(func),
        }
    }
}

impl HostFunction for ClosureFunction {
    fn name(&self) -> &str {
        &self.signature.name
    }

    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn documentation(&self) -> &str {
        &self.documentation
    }

    fn evaluate(&self, args: &[Value], context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        (self.func)(args, context)
    }
}

/// Registry of host functions by name
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn HostFunction>>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .finish()
    }
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trait-based function, replacing any function of the same name
    pub fn register<F: HostFunction + 'static>(&mut self, function: F) {
        let name = function.name().to_string();
        self.functions.insert(name, Arc::new(function));
    }

    /// Register a closure-based function
    pub fn register_closure<F>(
        &mut self,
        signature: FunctionSignature,
        documentation: impl Into<String>,
        func: F,
    ) where
        F: Fn(&[Value], &FunctionContext) -> FunctionResult<Value> + Send + Sync + 'static,
    {
        self.register(ClosureFunction::new(signature, documentation, func));
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn HostFunction>> {
        self.functions.get(name).cloned()
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Sorted names of all registered functions
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Evaluate a function by name
    pub fn evaluate_function(
        &self,
        name: &str,
        args: &[Value],
        context: &FunctionContext,
    ) -> FunctionResult<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| FunctionError::UndefinedFunction {
                name: name.to_string(),
            })?;
        function.evaluate(args, context)
    }
}

impl HostFunctions for FunctionRegistry {
    fn invoke(
        &self,
        name: &str,
        args: &[Value],
        context: &FunctionContext,
    ) -> FunctionResult<Value> {
        self.evaluate_function(name, args, context)
    }

    fn contains(&self, name: &str) -> bool {
        FunctionRegistry::contains(self, name)
    }
}
