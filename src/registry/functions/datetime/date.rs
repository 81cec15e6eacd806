//! date() function - formats a Unix timestamp

use std::fmt::Write as _;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};

use super::local_datetime;
use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::{optional_int_arg, string_arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// date() function - formats a timestamp with host format letters
pub struct DateFunction;

impl HostFunction for DateFunction {
    fn name(&self) -> &str {
        "date"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "date",
                vec![
                    ParameterInfo::required("format", TypeInfo::String),
                    ParameterInfo::optional("timestamp", TypeInfo::Integer),
                ],
                TypeInfo::String,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Formats a Unix timestamp (default: now) using date format letters such as Y-m-d H:i:s. \
         A backslash prints the next character literally."
    }

    fn evaluate(&self, args: &[Value], context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let format = string_arg(self.name(), args, 0, "format")?;
        let timestamp = optional_int_arg(self.name(), args, 1, "timestamp")?
            .unwrap_or_else(|| context.now().timestamp());
        let datetime = local_datetime(self.name(), timestamp, &context.timezone)?;
        Ok(Value::String(format_date(&format, &datetime)))
    }
}

/// Format a datetime with date format letters
///
/// Unknown letters are copied through, `\` escapes the following character.
pub fn format_date(format: &str, dt: &DateTime<FixedOffset>) -> String {
    let mut out = String::with_capacity(format.len() * 2);
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        // Writing to a String cannot fail
        let _ = match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                Ok(())
            }
            // Day
            'd' => write!(out, "{:02}", dt.day()),
            'D' => out.write_str(&weekday_name(dt)[..3]),
            'j' => write!(out, "{}", dt.day()),
            'l' => out.write_str(weekday_name(dt)),
            'N' => write!(out, "{}", dt.weekday().number_from_monday()),
            'S' => out.write_str(ordinal_suffix(dt.day())),
            'w' => write!(out, "{}", dt.weekday().num_days_from_sunday()),
            'z' => write!(out, "{}", dt.ordinal0()),
            // Week
            'W' => write!(out, "{:02}", dt.iso_week().week()),
            // Month
            'F' => out.write_str(month_name(dt)),
            'm' => write!(out, "{:02}", dt.month()),
            'M' => out.write_str(&month_name(dt)[..3]),
            'n' => write!(out, "{}", dt.month()),
            't' => write!(out, "{}", days_in_month(dt.year(), dt.month())),
            // Year
            'L' => write!(out, "{}", u8::from(is_leap_year(dt.year()))),
            'o' => write!(out, "{}", dt.iso_week().year()),
            'Y' => write!(out, "{}", dt.year()),
            'y' => write!(out, "{:02}", dt.year().rem_euclid(100)),
            // Time
            'a' => out.write_str(if dt.hour() < 12 { "am" } else { "pm" }),
            'A' => out.write_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            'B' => write!(out, "{:03}", swatch_beat(dt)),
            'g' => write!(out, "{}", hour12(dt.hour())),
            'G' => write!(out, "{}", dt.hour()),
            'h' => write!(out, "{:02}", hour12(dt.hour())),
            'H' => write!(out, "{:02}", dt.hour()),
            'i' => write!(out, "{:02}", dt.minute()),
            's' => write!(out, "{:02}", dt.second()),
            'u' => out.write_str("000000"),
            'v' => out.write_str("000"),
            // Timezone
            'e' | 'T' => out.write_str(&timezone_name(dt)),
            'I' => out.write_char('0'),
            'O' => out.write_str(&offset_string(dt, false)),
            'P' => out.write_str(&offset_string(dt, true)),
            'p' => {
                if dt.offset().local_minus_utc() == 0 {
                    out.write_char('Z')
                } else {
                    out.write_str(&offset_string(dt, true))
                }
            }
            'Z' => write!(out, "{}", dt.offset().local_minus_utc()),
            // Full date/time
            'c' => out.write_str(&format_date("Y-m-d\\TH:i:sP", dt)),
            'r' => out.write_str(&format_date("D, d M Y H:i:s O", dt)),
            'U' => write!(out, "{}", dt.timestamp()),
            other => out.write_char(other),
        };
    }

    out
}

fn weekday_name(dt: &DateTime<FixedOffset>) -> &'static str {
    DAY_NAMES[dt.weekday().num_days_from_monday() as usize]
}

fn month_name(dt: &DateTime<FixedOffset>) -> &'static str {
    MONTH_NAMES[dt.month0() as usize]
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn hour12(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

fn swatch_beat(dt: &DateTime<FixedOffset>) -> i64 {
    // Internet time is anchored to UTC+1
    let seconds = (dt.timestamp() + 3600).rem_euclid(86_400);
    (seconds * 10) / 864
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn offset_string(dt: &DateTime<FixedOffset>, colon: bool) -> String {
    let offset = dt.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    let (hours, minutes) = (offset / 3600, (offset % 3600) / 60);
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

fn timezone_name(dt: &DateTime<FixedOffset>) -> String {
    if dt.offset().local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        offset_string(dt, true)
    }
}
