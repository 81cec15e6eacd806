//! Command-line interface for the expression evaluator
//!
//! Evaluates an expression document against parameter tables and prints the
//! resolved JSON.

use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use code_builder::registry::InternalFunction;
use code_builder::{
    Evaluator, EvaluatorConfig, FunctionRegistry, JsonValue, create_standard_registry,
};

#[derive(Parser)]
#[command(name = "code-builder")]
#[command(about = "Evaluate JSON configuration expressions in a restricted sandbox")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression document
    Evaluate {
        /// JSON file with the expression (reads from stdin if not provided)
        file: Option<String>,
        /// JSON file with parameter tables, e.g. {"attr": {"token": "x"}}
        #[arg(short = 'P', long)]
        params: Option<String>,
        /// Additionally allow a function (repeatable)
        #[arg(long = "allow", value_name = "NAME")]
        allow: Vec<String>,
        /// Remove a function from the allowlist (repeatable)
        #[arg(long = "deny", value_name = "NAME")]
        deny: Vec<String>,
        /// Maximum nesting depth of the expression
        #[arg(long, default_value_t = 100)]
        max_depth: usize,
        /// UTC offset for date functions, e.g. +01:00
        #[arg(long, value_parser = parse_offset)]
        timezone: Option<FixedOffset>,
        /// Unix timestamp to use as the current time
        #[arg(long)]
        now: Option<i64>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// List the host function catalogue
    Functions,
}

fn main() {
    human_panic::setup_panic!();
    env_logger::init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Evaluate {
            file,
            params,
            allow,
            deny,
            max_depth,
            timezone,
            now,
            pretty,
        } => {
            let mut config = EvaluatorConfig::default().with_max_depth(max_depth);
            if let Some(timezone) = timezone {
                config = config.with_timezone(timezone);
            }
            if let Some(now) = now {
                let now = DateTime::from_timestamp(now, 0)
                    .ok_or_else(|| anyhow!("timestamp {now} is out of range"));
                match now {
                    Ok(now) => config = config.with_frozen_time(now),
                    Err(e) => fail(&e),
                }
            }
            handle_evaluate(file.as_deref(), params.as_deref(), config, &allow, &deny, pretty)
        }
        Commands::Functions => {
            handle_functions(&create_standard_registry());
            Ok(())
        }
    };

    if let Err(e) = outcome {
        fail(&e);
    }
}

fn fail(error: &anyhow::Error) -> ! {
    eprintln!("Error: {error:#}");
    process::exit(1);
}

fn handle_evaluate(
    file: Option<&str>,
    params: Option<&str>,
    config: EvaluatorConfig,
    allow: &[String],
    deny: &[String],
    pretty: bool,
) -> Result<()> {
    for warning in config.validate() {
        log::warn!("{warning}");
    }

    let tree = match file {
        Some(filename) => read_json_file(filename)?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading expression from stdin")?;
            serde_json::from_str(&buffer).context("parsing expression JSON")?
        }
    };
    let params = match params {
        Some(filename) => read_json_file(filename)?,
        None => JsonValue::Null,
    };

    let mut evaluator = Evaluator::with_config(config);
    for name in allow {
        evaluator.allow_function(name.as_str());
    }
    for name in deny {
        evaluator.deny_function(name);
    }
    for name in evaluator.unavailable_functions() {
        log::warn!("Function '{name}' is allowed but not implemented");
    }

    let result = evaluator.run(&tree, &params)?;
    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{output}");
    Ok(())
}

fn handle_functions(registry: &FunctionRegistry) {
    let evaluator = Evaluator::new();
    let marker = |name: &str| if evaluator.is_allowed(name) { "*" } else { " " };

    for internal in InternalFunction::ALL {
        println!("{} {internal}(...)  [internal]", marker(internal.name()));
    }
    for name in registry.function_names() {
        if let Some(function) = registry.get(name) {
            let purity = if function.is_pure() { "  [pure]" } else { "" };
            println!("{} {}{purity}", marker(name), function.signature());
            println!("    {}", function.documentation());
        }
    }
    println!();
    println!("* allowed by default; enable others with --allow NAME");
    println!("[pure] results depend only on the arguments");
}

fn read_json_file(filename: &str) -> Result<JsonValue> {
    let content =
        fs::read_to_string(filename).with_context(|| format!("reading file '{filename}'"))?;
    serde_json::from_str(&content).with_context(|| format!("parsing JSON in '{filename}'"))
}

fn parse_offset(input: &str) -> std::result::Result<FixedOffset, String> {
    let (sign, rest) = match input.as_bytes().first() {
        Some(b'+') => (1, &input[1..]),
        Some(b'-') => (-1, &input[1..]),
        _ => (1, input),
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().map_err(|_| format!("invalid offset '{input}'"))?;
    let minutes: i32 = minutes.parse().map_err(|_| format!("invalid offset '{input}'"))?;
    hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|seconds| seconds.checked_mul(sign))
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| format!("offset '{input}' is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset("+01:00").unwrap().local_minus_utc(), 3600);
        assert_eq!(parse_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_offset("2").unwrap().local_minus_utc(), 7200);
        assert!(parse_offset("+1x").is_err());
    }

    #[test]
    fn test_parse_offset_overflow_is_an_error() {
        assert_eq!(
            parse_offset("+999999999:00").unwrap_err(),
            "offset '+999999999:00' is out of range"
        );
        assert_eq!(
            parse_offset("-1:2147483647").unwrap_err(),
            "offset '-1:2147483647' is out of range"
        );
        assert!(parse_offset("+30:00").is_err());
    }
}
