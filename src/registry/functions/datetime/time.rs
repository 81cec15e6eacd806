//! time() function - returns the current Unix timestamp

use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::signature::FunctionSignature;

/// time() function - returns the current Unix timestamp
pub struct TimeFunction;

impl HostFunction for TimeFunction {
    fn name(&self) -> &str {
        "time"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> =
            std::sync::LazyLock::new(|| FunctionSignature::new("time", vec![], TypeInfo::Integer));
        &SIG
    }

    fn documentation(&self) -> &str {
        "Returns the current time measured in seconds since the Unix Epoch."
    }

    fn evaluate(&self, args: &[Value], context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        Ok(Value::Integer(context.now().timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_time_uses_frozen_clock() {
        let now = Utc.with_ymd_and_hms(2014, 12, 8, 9, 38, 35).unwrap();
        let context = FunctionContext::default().with_frozen_time(now);
        assert_eq!(
            TimeFunction.evaluate(&[], &context).unwrap(),
            Value::Integer(1418031515)
        );
    }

    #[test]
    fn test_time_rejects_arguments() {
        let err = TimeFunction
            .evaluate(&[Value::Integer(1)], &FunctionContext::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "time() expects exactly 0 parameters, 1 given");
    }
}
