//! Date and time functions: time(), date() and strtotime()

mod date;
mod strtotime;
mod time;

pub use date::{DateFunction, format_date};
pub use strtotime::{StrToTimeFunction, parse_datetime};
pub use time::TimeFunction;

use chrono::{DateTime, FixedOffset, TimeZone};

use crate::registry::function::{FunctionError, FunctionRegistry, FunctionResult};

/// Register all datetime functions
pub fn register_datetime_functions(registry: &mut FunctionRegistry) {
    registry.register(TimeFunction);
    registry.register(DateFunction);
    registry.register(StrToTimeFunction);
}

/// Unix timestamp seen in the given offset
pub(crate) fn local_datetime(
    name: &str,
    timestamp: i64,
    timezone: &FixedOffset,
) -> FunctionResult<DateTime<FixedOffset>> {
    timezone
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| FunctionError::evaluation(name, format!("Timestamp {timestamp} is out of range")))
}
