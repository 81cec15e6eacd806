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

//! Expression evaluator
//!
//! Evaluation is a single recursive walk over a classified [`Expression`].
//! Arguments are evaluated left to right before the call that consumes them,
//! and the first failure aborts the whole run.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::config::EvaluatorConfig;
use crate::error::{EvaluationError, Result};
use crate::model::{
    CallArguments, Expression, FunctionCall, FunctionName, JsonValue, ParamRef, ParameterTables,
    ReferenceKey, Value,
};
use crate::registry::{FunctionContext, HostFunctions, InternalFunction, create_standard_registry};

/// Evaluates expression trees against parameter tables
///
/// The evaluator owns its allowlist. [`run`](Self::run) only reads it, so a
/// shared evaluator can serve concurrent runs; changing the allowlist needs
/// `&mut self`.
///
/// # Examples
///
/// ```rust
/// use code_builder::evaluator::Evaluator;
/// use code_builder::model::Value;
/// use serde_json::json;
///
/// let evaluator = Evaluator::new();
/// let tree = json!({"function": "concat", "args": ["Bearer ", {"attr": "token"}]});
/// let params = json!({"attr": {"token": "abc"}});
///
/// assert_eq!(evaluator.run(&tree, &params).unwrap(), Value::string("Bearer abc"));
/// ```
pub struct Evaluator {
    allowed: IndexSet<String>,
    functions: Arc<dyn HostFunctions>,
    config: EvaluatorConfig,
}

impl Evaluator {
    /// Create an evaluator with the default allowlist and host catalogue
    pub fn new() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }

    /// Create an evaluator from a configuration
    pub fn with_config(config: EvaluatorConfig) -> Self {
        Self {
            allowed: config.allowed_functions.iter().cloned().collect(),
            functions: Arc::new(create_standard_registry()),
            config,
        }
    }

    /// Create an evaluator with a custom initial allowlist
    pub fn with_allowed_functions<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(EvaluatorConfig::default().with_allowed_functions(names))
    }

    /// Replace the host catalogue
    pub fn with_host_functions(mut self, functions: Arc<dyn HostFunctions>) -> Self {
        self.functions = functions;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Add a function to the allowlist
    pub fn allow_function(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.is_callable(&name) {
            log::debug!("Allowing function '{name}'");
        } else {
            log::warn!("Allowing function '{name}' that the host catalogue does not provide");
        }
        self.allowed.insert(name);
        self
    }

    /// Remove a function from the allowlist; unknown names are ignored
    pub fn deny_function(&mut self, name: &str) -> &mut Self {
        if self.allowed.shift_remove(name) {
            log::debug!("Denied function '{name}'");
        }
        self
    }

    /// Check whether a function may be called
    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    /// Allowed function names, in insertion order
    pub fn allowed_functions(&self) -> Vec<&str> {
        self.allowed.iter().map(String::as_str).collect()
    }

    /// Allowed names that neither the evaluator nor the host catalogue implement
    ///
    /// Calls to these fail with an undefined function error.
    pub fn unavailable_functions(&self) -> Vec<&str> {
        self.allowed
            .iter()
            .filter(|name| !self.is_callable(name))
            .map(String::as_str)
            .collect()
    }

    fn is_callable(&self, name: &str) -> bool {
        InternalFunction::from_name(name).is_some() || self.functions.contains(name)
    }

    /// Evaluate a decoded expression tree
    ///
    /// `params` maps namespaces to (possibly nested) tables; see
    /// [`ParameterTables::from_json`].
    pub fn run(&self, tree: &JsonValue, params: &JsonValue) -> Result<Value> {
        let tables = ParameterTables::from_json(params)?;
        self.run_with_tables(tree, &tables)
    }

    /// Evaluate a decoded expression tree against prepared tables
    pub fn run_with_tables(&self, tree: &JsonValue, tables: &ParameterTables) -> Result<Value> {
        log::debug!(
            "Evaluating expression with {} parameter namespace(s)",
            tables.len()
        );
        let expression = self.classify(tree, tables)?;
        self.evaluate(&expression, tables)
    }

    /// Classify a decoded tree using the namespaces present in `tables`
    pub fn classify(&self, tree: &JsonValue, tables: &ParameterTables) -> Result<Expression> {
        Expression::classify(
            tree,
            &|namespace| tables.contains_namespace(namespace),
            self.config.max_depth,
        )
    }

    /// Evaluate a classified expression
    pub fn evaluate(&self, expression: &Expression, tables: &ParameterTables) -> Result<Value> {
        let context = self.config.function_context();
        self.eval(expression, tables, &context)
    }

    fn eval(
        &self,
        expression: &Expression,
        tables: &ParameterTables,
        context: &FunctionContext,
    ) -> Result<Value> {
        match expression {
            Expression::Scalar(value) => Ok(value.clone()),
            Expression::Sequence(items) => items
                .iter()
                .map(|item| self.eval(item, tables, context))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Expression::PlainObject(fields) => fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), self.eval(v, tables, context)?)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(Value::Object),
            Expression::ParamRef(reference) => resolve_reference(reference, tables),
            Expression::FunctionCall(call) => self.call_function(call, tables, context),
        }
    }

    fn call_function(
        &self,
        call: &FunctionCall,
        tables: &ParameterTables,
        context: &FunctionContext,
    ) -> Result<Value> {
        let name = match &call.name {
            FunctionName::Named(name) if self.is_allowed(name) => name,
            FunctionName::Named(name) | FunctionName::Invalid(name) => {
                log::warn!("Rejected call to function '{name}'");
                return Err(EvaluationError::illegal_function(name.clone()));
            }
        };

        let args = match &call.args {
            CallArguments::List(items) => items
                .iter()
                .map(|item| self.eval(item, tables, context))
                .collect::<Result<Vec<_>>>()?,
            CallArguments::Invalid => {
                return Err(EvaluationError::InvalidArguments { name: name.clone() });
            }
        };

        if let Some(internal) = InternalFunction::from_name(name) {
            log::trace!("Calling internal function '{internal}'");
            return internal.call(args);
        }

        log::debug!("Dispatching '{name}' with {} argument(s)", args.len());
        self.functions.invoke(name, &args, context).map_err(|e| {
            log::warn!("Function '{name}' failed: {e}");
            EvaluationError::function_failure(name.clone(), &e)
        })
    }
}

fn resolve_reference(reference: &ParamRef, tables: &ParameterTables) -> Result<Value> {
    let namespace = &reference.namespace;
    let key = match &reference.key {
        ReferenceKey::Key(key) => key,
        ReferenceKey::Invalid(json) => {
            return Err(EvaluationError::InvalidReference {
                namespace: namespace.clone(),
                reference: json.clone(),
            });
        }
    };

    log::trace!("Resolving {namespace} '{key}'");
    tables
        .get(namespace, key)
        .cloned()
        .ok_or_else(|| EvaluationError::reference_not_found(namespace.clone(), key.clone()))
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("allowed", &self.allowed)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
