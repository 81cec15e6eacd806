//! Type conversion functions

mod gettype;
mod intval;
mod strval;

pub use gettype::GetTypeFunction;
pub use intval::IntvalFunction;
pub use strval::StrvalFunction;

use crate::registry::function::FunctionRegistry;

/// Register all conversion functions
pub fn register_conversion_functions(registry: &mut FunctionRegistry) {
    registry.register(IntvalFunction);
    registry.register(StrvalFunction);
    registry.register(GetTypeFunction);
}
