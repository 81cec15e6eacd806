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

//! Sandboxed evaluator for JSON-encoded configuration expressions
//!
//! Configuration documents describe dynamic values (authentication headers,
//! signed request parameters, date ranges) as trees of function calls,
//! parameter references and literals:
//!
//! ```json
//! {"function": "concat", "args": ["Bearer ", {"attr": "token"}]}
//! ```
//!
//! The [`Evaluator`] resolves such a tree against parameter tables and calls
//! only functions on its allowlist. Host functions (digests, dates,
//! formatting) come from a [`FunctionRegistry`] and can be replaced.
//!
//! ```rust
//! use code_builder::{Evaluator, Value};
//! use serde_json::json;
//!
//! let evaluator = Evaluator::new();
//! let tree = json!({
//!     "function": "ifempty",
//!     "args": [{"attr": "name"}, "anonymous"]
//! });
//! let params = json!({"attr": {"name": ""}});
//!
//! assert_eq!(evaluator.run(&tree, &params).unwrap(), Value::string("anonymous"));
//! ```

pub mod error;
pub mod evaluator;
pub mod model;
pub mod registry;

pub use error::{ErrorKind, EvaluationError, Result};
pub use evaluator::{Evaluator, EvaluatorConfig};
pub use model::{Expression, JsonValue, ParameterTables, Value};
pub use registry::{
    DEFAULT_ALLOWED_FUNCTIONS, FunctionRegistry, HostFunction, HostFunctions,
    create_standard_registry,
};
