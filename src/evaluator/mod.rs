//! Expression evaluation
//!
//! [`Evaluator`] walks classified expression trees, resolves parameter
//! references and dispatches allowed function calls.

mod config;
mod engine;

pub use config::EvaluatorConfig;
pub use engine::Evaluator;
