//! strtotime() function - parses textual date descriptions
//!
//! Full RFC 3339 and RFC 2822 strings are parsed directly. Everything else
//! goes through a small token parser that understands the common absolute
//! formats (`2014-12-08`, `12/08/2014`, `8 December 2014`, `10:38pm`, `@ts`)
//! and relative phrases (`+1 day`, `2 weeks ago`, `next monday`,
//! `first day of next month`, `tomorrow noon`). Unparseable input yields
//! `false` rather than an error.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Weekday};
use regex::{Captures, Regex};

use super::date::days_in_month;
use crate::model::{TypeInfo, Value};
use crate::registry::function::{FunctionContext, FunctionResult, HostFunction};
use crate::registry::functions::{optional_int_arg, string_arg};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

macro_rules! pattern {
    ($re:expr) => {
        LazyLock::new(|| Regex::new($re).expect("valid strtotime pattern"))
    };
}

static TIMESTAMP: LazyLock<Regex> = pattern!(r"^@(-?\d+)");
static ISO_DATE: LazyLock<Regex> = pattern!(r"^(\d{4})-(\d{1,2})-(\d{1,2})t?");
static SLASH_DATE: LazyLock<Regex> = pattern!(r"^(\d{4})/(\d{1,2})/(\d{1,2})");
static US_DATE: LazyLock<Regex> = pattern!(r"^(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b");
static DMY_DATE: LazyLock<Regex> = pattern!(r"^(\d{1,2})[.-](\d{1,2})[.-](\d{4})\b");
static MONTH_YEAR: LazyLock<Regex> =
    pattern!(r"^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{4})\b");
static DAY_MONTH: LazyLock<Regex> = pattern!(
    r"^(\d{1,2})(?:st|nd|rd|th)?[\s-]*(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?(?:[\s,-]+(\d{4})\b)?"
);
static MONTH_DAY: LazyLock<Regex> = pattern!(
    r"^(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s-]+(\d{1,2})(?:st|nd|rd|th)?\b(?:,?\s+(\d{4})\b)?"
);
static TIME: LazyLock<Regex> =
    pattern!(r"^(\d{1,2}):(\d{2})(?::(\d{2})(?:[.,]\d+)?)?(?:\s*([ap])\.?m\.?)?");
static HOUR_MERIDIEM: LazyLock<Regex> = pattern!(r"^(\d{1,2})\s*([ap])\.?m\.?");
static RELATIVE: LazyLock<Regex> = pattern!(
    r"^([+-]?)\s*(\d+)\s*(seconds|second|secs|sec|minutes|minute|mins|min|hours|hour|days|day|weeks|week|fortnights|fortnight|months|month|years|year)\b"
);
static AGO: LazyLock<Regex> = pattern!(r"^ago\b");
static KEYWORD: LazyLock<Regex> = pattern!(r"^(now|today|midnight|noon|tomorrow|yesterday)\b");
static DAY_OF: LazyLock<Regex> = pattern!(r"^(first|last)\s+day\s+of\b");
static RELATIVE_TEXT: LazyLock<Regex> = pattern!(r"^(next|last|previous|this)\s+([a-z]+)\b");
static WEEKDAY: LazyLock<Regex> = pattern!(r"^([a-z]+)\b");
static TZ_NAME: LazyLock<Regex> = pattern!(r"^(z|utc|gmt)\b");
static TZ_OFFSET: LazyLock<Regex> = pattern!(r"^([+-])(\d{1,2})(?::?(\d{2}))?");

/// strtotime() function - parses a date description into a Unix timestamp
pub struct StrToTimeFunction;

impl HostFunction for StrToTimeFunction {
    fn name(&self) -> &str {
        "strtotime"
    }

    fn signature(&self) -> &FunctionSignature {
        static SIG: LazyLock<FunctionSignature> = LazyLock::new(|| {
            FunctionSignature::new(
                "strtotime",
                vec![
                    ParameterInfo::required("datetime", TypeInfo::String),
                    ParameterInfo::optional("baseTimestamp", TypeInfo::Integer),
                ],
                TypeInfo::Integer,
            )
        });
        &SIG
    }

    fn documentation(&self) -> &str {
        "Parses an English textual datetime description into a Unix timestamp, relative to \
         baseTimestamp (default: now). Returns false when the text cannot be parsed."
    }

    fn evaluate(&self, args: &[Value], context: &FunctionContext) -> FunctionResult<Value> {
        self.validate_args(args)?;
        let input = string_arg(self.name(), args, 0, "datetime")?;
        let base = optional_int_arg(self.name(), args, 1, "baseTimestamp")?
            .unwrap_or_else(|| context.now().timestamp());

        match parse_datetime(&input, base, &context.timezone) {
            Some(timestamp) => Ok(Value::Integer(timestamp)),
            None => {
                log::trace!("strtotime could not parse {input:?}");
                Ok(Value::Bool(false))
            }
        }
    }
}

/// Parse a date description relative to `base`
///
/// Local dates without an explicit offset are read in `timezone`.
pub fn parse_datetime(input: &str, base: i64, timezone: &FixedOffset) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.timestamp());
    }

    let lowered = trimmed.to_ascii_lowercase();
    let mut parsed = ParsedTime::default();
    let mut rest = lowered.as_str();
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }
        let consumed = parsed.token(rest)?;
        rest = &rest[consumed..];
    }
    parsed.resolve(base, timezone)
}

#[derive(Debug, Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Fortnight,
    Month,
    Year,
}

impl Unit {
    fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "sec" | "secs" | "second" | "seconds" => Self::Second,
            "min" | "mins" | "minute" | "minutes" => Self::Minute,
            "hour" | "hours" => Self::Hour,
            "day" | "days" => Self::Day,
            "week" | "weeks" => Self::Week,
            "fortnight" | "fortnights" => Self::Fortnight,
            "month" | "months" => Self::Month,
            "year" | "years" => Self::Year,
            _ => return None,
        })
    }
}

fn weekday_from_word(word: &str) -> Option<Weekday> {
    Some(match word {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    })
}

fn month_from_abbrev(abbrev: &str) -> Option<u32> {
    let months = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    months
        .iter()
        .position(|m| *m == abbrev)
        .and_then(|i| u32::try_from(i + 1).ok())
}

#[derive(Debug, Clone, Copy)]
enum WeekdayShift {
    This,
    Next,
    Last,
}

#[derive(Debug, Clone, Copy)]
enum DayOf {
    First,
    Last,
}

#[derive(Debug, Default)]
struct Relative {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

impl Relative {
    fn add(&mut self, unit: Unit, amount: i64) {
        let (field, factor) = match unit {
            Unit::Second => (&mut self.seconds, 1),
            Unit::Minute => (&mut self.minutes, 1),
            Unit::Hour => (&mut self.hours, 1),
            Unit::Day => (&mut self.days, 1),
            Unit::Week => (&mut self.days, 7),
            Unit::Fortnight => (&mut self.days, 14),
            Unit::Month => (&mut self.months, 1),
            Unit::Year => (&mut self.years, 1),
        };
        *field = field.saturating_add(amount.saturating_mul(factor));
    }

    fn negate(&mut self) {
        for field in [
            &mut self.years,
            &mut self.months,
            &mut self.days,
            &mut self.hours,
            &mut self.minutes,
            &mut self.seconds,
        ] {
            *field = field.saturating_neg();
        }
    }

    fn clock_seconds(&self) -> Option<i64> {
        self.days
            .checked_mul(86_400)?
            .checked_add(self.hours.checked_mul(3_600)?)?
            .checked_add(self.minutes.checked_mul(60)?)?
            .checked_add(self.seconds)
    }
}

#[derive(Debug, Default)]
struct ParsedTime {
    /// Year (current year when omitted), month and unvalidated day
    date: Option<(Option<i32>, u32, u32)>,
    time: Option<NaiveTime>,
    offset: Option<FixedOffset>,
    timestamp: Option<i64>,
    reset_time: bool,
    relative: Relative,
    weekday: Option<(Weekday, WeekdayShift)>,
    day_of: Option<DayOf>,
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

impl ParsedTime {
    /// Consume one token, returning its length
    fn token(&mut self, rest: &str) -> Option<usize> {
        if let Some(caps) = TIMESTAMP.captures(rest) {
            if self.timestamp.replace(number(&caps, 1)?).is_some() {
                return None;
            }
            return consumed(&caps);
        }
        if let Some(caps) = ISO_DATE.captures(rest).or_else(|| SLASH_DATE.captures(rest)) {
            self.set_date(Some(number(&caps, 1)?), number(&caps, 2)?, number(&caps, 3)?)?;
            return consumed(&caps);
        }
        if let Some(caps) = US_DATE.captures(rest) {
            let year = expand_year(number(&caps, 3)?, caps.get(3)?.as_str().len());
            self.set_date(Some(year), number(&caps, 1)?, number(&caps, 2)?)?;
            return consumed(&caps);
        }
        if let Some(caps) = DMY_DATE.captures(rest) {
            self.set_date(Some(number(&caps, 3)?), number(&caps, 2)?, number(&caps, 1)?)?;
            return consumed(&caps);
        }
        if let Some(caps) = MONTH_YEAR.captures(rest) {
            let month = month_from_abbrev(caps.get(1)?.as_str())?;
            self.set_date(Some(number(&caps, 2)?), month, 1)?;
            return consumed(&caps);
        }
        if let Some(caps) = DAY_MONTH.captures(rest) {
            let month = month_from_abbrev(caps.get(2)?.as_str())?;
            self.set_date(number(&caps, 3), month, number(&caps, 1)?)?;
            return consumed(&caps);
        }
        if let Some(caps) = MONTH_DAY.captures(rest) {
            let month = month_from_abbrev(caps.get(1)?.as_str())?;
            self.set_date(number(&caps, 3), month, number(&caps, 2)?)?;
            return consumed(&caps);
        }
        if let Some(caps) = TIME.captures(rest) {
            let meridiem = caps.get(4).map(|m| m.as_str());
            let second = number(&caps, 3).unwrap_or(0);
            self.set_time(number(&caps, 1)?, number(&caps, 2)?, second, meridiem)?;
            return consumed(&caps);
        }
        if let Some(caps) = HOUR_MERIDIEM.captures(rest) {
            let meridiem = caps.get(2).map(|m| m.as_str());
            self.set_time(number(&caps, 1)?, 0, 0, meridiem)?;
            return consumed(&caps);
        }
        if let Some(caps) = RELATIVE.captures(rest) {
            let amount: i64 = number(&caps, 2)?;
            let amount = if &caps[1] == "-" { -amount } else { amount };
            self.relative.add(Unit::from_word(&caps[3])?, amount);
            return consumed(&caps);
        }
        if let Some(caps) = AGO.captures(rest) {
            self.relative.negate();
            return consumed(&caps);
        }
        if let Some(caps) = KEYWORD.captures(rest) {
            match &caps[1] {
                "today" | "midnight" => self.reset_time = true,
                "noon" => self.set_time(12, 0, 0, None)?,
                "tomorrow" => {
                    self.reset_time = true;
                    self.relative.add(Unit::Day, 1);
                }
                "yesterday" => {
                    self.reset_time = true;
                    self.relative.add(Unit::Day, -1);
                }
                _ => {}
            }
            return consumed(&caps);
        }
        if let Some(caps) = DAY_OF.captures(rest) {
            self.day_of = Some(if &caps[1] == "first" {
                DayOf::First
            } else {
                DayOf::Last
            });
            return consumed(&caps);
        }
        if let Some(caps) = RELATIVE_TEXT.captures(rest) {
            let (amount, shift) = match &caps[1] {
                "next" => (1, WeekdayShift::Next),
                "this" => (0, WeekdayShift::This),
                _ => (-1, WeekdayShift::Last),
            };
            let word = &caps[2];
            if let Some(unit) = Unit::from_word(word) {
                self.relative.add(unit, amount);
            } else {
                self.set_weekday(weekday_from_word(word)?, shift)?;
            }
            return consumed(&caps);
        }
        if let Some(caps) = TZ_NAME.captures(rest) {
            self.set_offset(0)?;
            return consumed(&caps);
        }
        if let Some(caps) = TZ_OFFSET.captures(rest) {
            let hours: i32 = number(&caps, 2)?;
            let minutes: i32 = number(&caps, 3).unwrap_or(0);
            let seconds = hours * 3_600 + minutes * 60;
            self.set_offset(if &caps[1] == "-" { -seconds } else { seconds })?;
            return consumed(&caps);
        }
        if let Some(caps) = WEEKDAY.captures(rest) {
            self.set_weekday(weekday_from_word(&caps[1])?, WeekdayShift::This)?;
            return consumed(&caps);
        }
        None
    }

    fn set_date(&mut self, year: Option<i32>, month: u32, day: u32) -> Option<()> {
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) || self.date.is_some() {
            return None;
        }
        self.date = Some((year, month, day));
        Some(())
    }

    fn set_time(&mut self, hour: u32, minute: u32, second: u32, meridiem: Option<&str>) -> Option<()> {
        let hour = match meridiem {
            Some(m) if (1..=12).contains(&hour) => (hour % 12) + if m == "p" { 12 } else { 0 },
            Some(_) => return None,
            None => hour,
        };
        if self.time.is_some() {
            return None;
        }
        self.time = Some(NaiveTime::from_hms_opt(hour, minute, second)?);
        Some(())
    }

    fn set_weekday(&mut self, weekday: Weekday, shift: WeekdayShift) -> Option<()> {
        if self.weekday.is_some() {
            return None;
        }
        self.weekday = Some((weekday, shift));
        self.reset_time = true;
        Some(())
    }

    fn set_offset(&mut self, seconds: i32) -> Option<()> {
        if self.offset.is_some() {
            return None;
        }
        self.offset = Some(FixedOffset::east_opt(seconds)?);
        Some(())
    }

    fn resolve(self, base: i64, timezone: &FixedOffset) -> Option<i64> {
        let utc = FixedOffset::east_opt(0)?;
        let offset = self
            .offset
            .or(self.timestamp.map(|_| utc))
            .unwrap_or(*timezone);
        let instant = DateTime::from_timestamp(self.timestamp.unwrap_or(base), 0)?;
        let base_local = instant.with_timezone(&offset).naive_local();

        let mut date = match self.date {
            Some((year, month, day)) => {
                overflow_date(year.unwrap_or(base_local.year()), month, i64::from(day))?
            }
            None => base_local.date(),
        };
        let time = match self.time {
            Some(time) => time,
            None if self.date.is_some() || self.reset_time => NaiveTime::MIN,
            None => base_local.time(),
        };

        let months = self.relative.years.checked_mul(12)?.checked_add(self.relative.months)?;
        if months != 0 {
            date = add_months(date, months)?;
        }
        if let Some(day_of) = self.day_of {
            let day = match day_of {
                DayOf::First => 1,
                DayOf::Last => days_in_month(date.year(), date.month()),
            };
            date = date.with_day(day)?;
        }
        if let Some((weekday, shift)) = self.weekday {
            date = shift_to_weekday(date, weekday, shift)?;
        }

        let local = date
            .and_time(time)
            .checked_add_signed(Duration::try_seconds(self.relative.clock_seconds()?)?)?;
        local
            .and_utc()
            .timestamp()
            .checked_sub(i64::from(offset.local_minus_utc()))
    }
}

fn consumed(caps: &Captures<'_>) -> Option<usize> {
    caps.get(0).map(|m| m.end())
}

fn expand_year(year: i32, digits: usize) -> i32 {
    match (digits, year) {
        (2, 0..=69) => 2000 + year,
        (2, _) => 1900 + year,
        _ => year,
    }
}

/// Build a date letting days past the end of the month roll over
fn overflow_date(year: i32, month: u32, day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_signed(Duration::try_days(day - 1)?)
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let index = i64::from(date.year())
        .checked_mul(12)?
        .checked_add(i64::from(date.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    overflow_date(year, month, i64::from(date.day()))
}

fn shift_to_weekday(date: NaiveDate, weekday: Weekday, shift: WeekdayShift) -> Option<NaiveDate> {
    let current = i64::from(date.weekday().num_days_from_monday());
    let target = i64::from(weekday.num_days_from_monday());
    let days = match shift {
        WeekdayShift::This => (target - current).rem_euclid(7),
        WeekdayShift::Next => match (target - current).rem_euclid(7) {
            0 => 7,
            n => n,
        },
        WeekdayShift::Last => match (current - target).rem_euclid(7) {
            0 => -7,
            n => -n,
        },
    };
    date.checked_add_signed(Duration::try_days(days)?)
}
