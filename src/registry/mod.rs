//! Function registry for expression evaluation
//!
//! Host functions implement [`HostFunction`] and are collected in a
//! [`FunctionRegistry`]; the evaluator reaches them through the
//! [`HostFunctions`] capability so the catalogue can be replaced. The two
//! evaluator-defined functions live in [`InternalFunction`].

#![warn(missing_docs)]

pub mod function;
pub mod functions;
pub mod internal;
pub mod signature;

pub use function::{
    ClosureFunction, FunctionContext, FunctionError, FunctionRegistry, FunctionResult,
    HostFunction, HostFunctions,
};
pub use internal::InternalFunction;
pub use signature::{FunctionSignature, ParameterInfo};

/// Functions the evaluator may call unless configured otherwise, in order
pub const DEFAULT_ALLOWED_FUNCTIONS: [&str; 12] = [
    "md5",
    "sha1",
    "time",
    "date",
    "strtotime",
    "base64_encode",
    "hash_hmac",
    "sprintf",
    "concat",
    "ifempty",
    "implode",
    "hash",
];

/// Create a registry with the full host catalogue
///
/// The catalogue also contains functions outside
/// [`DEFAULT_ALLOWED_FUNCTIONS`]; they become callable once allowed.
pub fn create_standard_registry() -> FunctionRegistry {
    let mut functions = FunctionRegistry::new();
    functions::register_standard_functions(&mut functions);
    functions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_default_allowlist() {
        let registry = create_standard_registry();
        for name in DEFAULT_ALLOWED_FUNCTIONS {
            assert!(
                registry.contains(name) || InternalFunction::from_name(name).is_some(),
                "{name} is neither a host nor an internal function"
            );
        }
    }

    #[test]
    fn test_standard_registry_extras() {
        let registry = create_standard_registry();
        for name in [
            "intval",
            "strval",
            "gettype",
            "urlencode",
            "strtolower",
            "strtoupper",
            "trim",
        ] {
            assert!(registry.contains(name), "{name} missing");
        }
        assert!(!registry.contains("concat"));
    }

    #[test]
    fn test_clock_functions_are_not_pure() {
        let registry = create_standard_registry();
        for name in ["time", "date", "strtotime"] {
            assert!(!registry.get(name).unwrap().is_pure(), "{name} reads the clock");
        }
        for name in ["md5", "hash_hmac", "sprintf", "implode", "intval"] {
            assert!(registry.get(name).unwrap().is_pure(), "{name} should be pure");
        }
    }
}
