//! Data model for expression evaluation
//!
//! This module provides the runtime value type, the classified expression
//! tree and the parameter tables references are resolved against.

pub mod expression;
pub mod params;
pub mod types;
pub mod value;

pub use expression::{CallArguments, Expression, FunctionCall, FunctionName, ParamRef, ReferenceKey};
pub use params::{FlatTable, ParameterTables, flatten};
pub use types::TypeInfo;
pub use value::Value;

/// JSON value as produced by the decoder
pub use serde_json::Value as JsonValue;
