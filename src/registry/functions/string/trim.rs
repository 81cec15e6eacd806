//! trim() function - strips characters from both ends

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::string_arg;
use crate::registry::signature::{FunctionSignature, ParameterInfo};

const DEFAULT_CHARACTERS: &str = " \n\r\t\u{0b}\0";

/// trim() function - strips whitespace or a custom character list
pub struct TrimFunction;

impl HostFunction for TrimFunction {
    fn name(&self) -> &str {
        "trim"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "trim",
                vec![
                    ParameterInfo::required("string", TypeInfo::String),
                    ParameterInfo::optional("characters", TypeInfo::String),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Strips whitespace (or the given characters, with a..z ranges) from the beginning and end of a string."
    }

    fn is_pure(&self) -> bool {
        true
    }

    fn evaluate(&self, args: &[Value], _context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let input = string_arg(self.name(), args, 0, "string")?;
        let characters = match args.get(1) {
            Some(_) => string_arg(self.name(), args, 1, "characters")?.into_owned(),
            None => DEFAULT_CHARACTERS.to_string(),
        };
        let set = expand_character_list(&characters);
        Ok(Value::String(
            input.trim_matches(|c: char| set.contains(&c)).to_string(),
        ))
    }
}

/// Expand `a..z` ranges in a character list
fn expand_character_list(list: &str) -> Vec<char> {
    let chars: Vec<char> = list.chars().collect();
    let mut set = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if i + 3 < chars.len() && chars[i + 1] == '.' && chars[i + 2] == '.' && chars[i] <= chars[i + 3] {
            set.extend(chars[i]..=chars[i + 3]);
            i += 4;
        } else {
            set.push(chars[i]);
            i += 1;
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(args: &[Value]) -> Value {
        TrimFunction
            .evaluate(args, &FunctionContext::default())
            .unwrap()
    }

    #[test]
    fn test_default_whitespace() {
        assert_eq!(trim(&[Value::string("\t token \n")]), Value::string("token"));
    }

    #[test]
    fn test_custom_characters() {
        assert_eq!(
            trim(&[Value::string("--token=="), Value::string("-=")]),
            Value::string("token")
        );
    }

    #[test]
    fn test_character_ranges() {
        assert_eq!(
            trim(&[Value::string("0042abc17"), Value::string("0..9")]),
            Value::string("abc")
        );
    }
}
