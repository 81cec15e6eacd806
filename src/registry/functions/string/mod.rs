//! String functions

mod base64_encode;
mod case;
mod implode;
mod sprintf;
mod trim;
mod urlencode;

pub use base64_encode::Base64EncodeFunction;
pub use case::{StrToLowerFunction, StrToUpperFunction};
pub use implode::ImplodeFunction;
pub use sprintf::{SprintfFunction, format_printf};
pub use trim::TrimFunction;
pub use urlencode::UrlEncodeFunction;

use crate::registry::function::FunctionRegistry;

/// Register all string functions
pub fn register_string_functions(registry: &mut FunctionRegistry) {
    registry.register(Base64EncodeFunction);
    registry.register(SprintfFunction);
    registry.register(ImplodeFunction);
    registry.register(UrlEncodeFunction);
    registry.register(StrToLowerFunction);
    registry.register(StrToUpperFunction);
    registry.register(TrimFunction);
}
