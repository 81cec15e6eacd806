//! Evaluator configuration
//!
//! Limits, the initial allowlist and the clock settings handed to host
//! functions.

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::registry::{DEFAULT_ALLOWED_FUNCTIONS, FunctionContext};

/// Largest offset in use by any real-world timezone (UTC+14)
const MAX_REAL_OFFSET_SECONDS: i32 = 14 * 3600;

/// Clock pinned by [`EvaluatorConfig::for_testing`]: 2014-12-08T09:38:35Z
const TESTING_TIMESTAMP: i64 = 1_418_031_515;

/// Configuration for an [`Evaluator`](crate::evaluator::Evaluator)
///
/// # Examples
///
/// ```rust
/// use chrono::FixedOffset;
/// use code_builder::evaluator::EvaluatorConfig;
///
/// let config = EvaluatorConfig::default()
///     .with_max_depth(50)
///     .with_timezone(FixedOffset::east_opt(3600).unwrap())
///     .with_allowed_functions(["concat", "md5"]);
///
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Maximum nesting of arrays and objects in an expression tree
    ///
    /// Deeper trees are rejected before evaluation starts. Default: 100
    pub max_depth: usize,

    /// Offset used by date functions for local time. Default: UTC
    pub timezone: FixedOffset,

    /// Initial allowlist, in order. Default: [`DEFAULT_ALLOWED_FUNCTIONS`]
    pub allowed_functions: Vec<String>,

    /// Fixed current time for `time`, `date` and `strtotime`
    ///
    /// `None` reads the system clock. Default: `None`
    pub frozen_time: Option<DateTime<Utc>>,
}

impl EvaluatorConfig {
    /// Create new configuration with all defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the offset used for local dates
    pub fn with_timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    /// Replace the initial allowlist
    pub fn with_allowed_functions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_functions = names.into_iter().map(Into::into).collect();
        self
    }

    /// Pin the current time
    pub fn with_frozen_time(mut self, now: DateTime<Utc>) -> Self {
        self.frozen_time = Some(now);
        self
    }

    /// Create testing configuration
    ///
    /// Shallow depth limit and a pinned clock, so date output is reproducible.
    pub fn for_testing() -> Self {
        Self {
            max_depth: 20,
            frozen_time: DateTime::from_timestamp(TESTING_TIMESTAMP, 0),
            ..Self::default()
        }
    }

    /// Context handed to host functions
    pub fn function_context(&self) -> FunctionContext {
        FunctionContext {
            timezone: self.timezone,
            frozen_time: self.frozen_time,
        }
    }

    /// Validate configuration values
    ///
    /// Returns warnings for settings that are legal but probably mistaken.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_depth > 1000 {
            warnings.push("max_depth is very high (>1000) - may cause stack overflow".to_string());
        } else if self.max_depth < 10 {
            warnings.push(
                "max_depth is very low (<10) - may reject ordinary expressions".to_string(),
            );
        }

        if self.timezone.local_minus_utc().abs() > MAX_REAL_OFFSET_SECONDS {
            warnings.push(format!(
                "timezone offset {} is outside the range of real-world timezones",
                self.timezone
            ));
        }

        if self.allowed_functions.is_empty() {
            warnings.push("allowed_functions is empty - every function call will fail".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.allowed_functions {
            if !seen.insert(name.as_str()) {
                warnings.push(format!("allowed_functions lists '{name}' more than once"));
            }
        }

        warnings
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 100,
            timezone: Utc.fix(),
            allowed_functions: DEFAULT_ALLOWED_FUNCTIONS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            frozen_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.max_depth, 100);
        assert_eq!(config.timezone.local_minus_utc(), 0);
        assert_eq!(config.allowed_functions.len(), 12);
        assert_eq!(config.allowed_functions[0], "md5");
        assert!(config.frozen_time.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let config = EvaluatorConfig::default()
            .with_max_depth(50)
            .with_timezone(tz)
            .with_allowed_functions(["concat"]);

        assert_eq!(config.max_depth, 50);
        assert_eq!(config.timezone, tz);
        assert_eq!(config.allowed_functions, vec!["concat".to_string()]);
        assert_eq!(config.function_context().timezone, tz);
    }

    #[test]
    fn test_testing_preset_pins_clock() {
        let config = EvaluatorConfig::for_testing();
        assert_eq!(config.max_depth, 20);
        assert_eq!(
            config.function_context().now().timestamp(),
            TESTING_TIMESTAMP
        );
    }

    #[test]
    fn test_config_validation() {
        assert!(EvaluatorConfig::default().validate().is_empty());

        let warnings = EvaluatorConfig::default().with_max_depth(5000).validate();
        assert!(warnings.iter().any(|w| w.contains("very high")));

        let warnings = EvaluatorConfig::default().with_max_depth(2).validate();
        assert!(warnings.iter().any(|w| w.contains("very low")));

        let warnings = EvaluatorConfig::default()
            .with_allowed_functions(Vec::<String>::new())
            .validate();
        assert!(warnings.iter().any(|w| w.contains("every function call will fail")));

        let warnings = EvaluatorConfig::default()
            .with_allowed_functions(["md5", "md5"])
            .validate();
        assert!(warnings.iter().any(|w| w.contains("more than once")));

        let warnings = EvaluatorConfig::default()
            .with_timezone(FixedOffset::east_opt(20 * 3600).unwrap())
            .validate();
        assert!(warnings.iter().any(|w| w.contains("real-world")));
    }
}
