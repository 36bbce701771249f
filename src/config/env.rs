//! `SCRAPER_*` environment variable overrides

use crate::config::types::Config;
use crate::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Applies environment overrides on top of an already-loaded configuration
///
/// `lookup` maps a variable name to its value; the loaders pass
/// `std::env::var`, tests pass closures.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let crawler = &mut config.crawler;

    if let Some(v) = parsed::<usize, _>(&lookup, "SCRAPER_MAX_CONCURRENT")? {
        crawler.max_concurrent = v;
    }
    if let Some(v) = duration_ms(&lookup, "SCRAPER_REQUEST_TIMEOUT")? {
        crawler.request_timeout_ms = v;
    }
    if let Some(v) = duration_ms(&lookup, "SCRAPER_TOTAL_TIMEOUT")? {
        crawler.total_timeout_ms = v;
    }
    if let Some(v) = parsed::<u32, _>(&lookup, "SCRAPER_RETRY_ATTEMPTS")? {
        crawler.retry_attempts = v;
    }
    if let Some(v) = duration_ms(&lookup, "SCRAPER_RETRY_DELAY")? {
        crawler.retry_delay_ms = v;
    }
    if let Some(v) = parsed::<u32, _>(&lookup, "SCRAPER_CIRCUIT_BREAKER_THRESHOLD")? {
        crawler.circuit_breaker_threshold = v;
    }
    if let Some(v) = duration_ms(&lookup, "SCRAPER_CIRCUIT_BREAKER_TIMEOUT")? {
        crawler.circuit_breaker_timeout_ms = v;
    }
    if let Some(v) = parsed::<usize, _>(&lookup, "SCRAPER_MAX_PAGES")? {
        crawler.max_pages = v;
    }
    if let Some(v) = parsed::<usize, _>(&lookup, "SCRAPER_MAX_CONTENT_BYTES")? {
        crawler.max_content_bytes = v;
    }

    if let Some(v) = non_empty(&lookup, "SCRAPER_USER_AGENT") {
        config.fetch.user_agent = v;
    }
    if let Some(v) = non_empty(&lookup, "SCRAPER_OUTPUT_FILE") {
        config.output.output_file = v;
    }
    if let Some(v) = non_empty(&lookup, "SCRAPER_LOG_LEVEL") {
        config.output.log_level = v.to_lowercase();
    }
    if let Some(v) = non_empty(&lookup, "SCRAPER_ENABLE_METRICS") {
        config.output.enable_metrics = v.eq_ignore_ascii_case("true");
    }

    Ok(())
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).filter(|v| !v.trim().is_empty())
}

fn parsed<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, var) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env {
                var: var.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

fn duration_ms<F>(lookup: &F, var: &str) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, var) {
        Some(value) => parse_duration(&value)
            .map(|d| Some(d.as_millis() as u64))
            .ok_or_else(|| ConfigError::Env {
                var: var.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

/// Parses a duration such as `500ms`, `1.5s` or `1m30s`, or a bare millisecond count
///
/// A duration is a sequence of decimal numbers, each with an optional fraction
/// and a unit suffix: `ns`, `us` (or `µs`), `ms`, `s`, `m` or `h`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<u64>() {
        return Some(Duration::from_millis(millis));
    }
    if value.is_empty() {
        return None;
    }

    let mut total_nanos = 0f64;
    let mut rest = value;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_end);
        if !number.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        let amount: f64 = number.parse().ok()?;

        let unit_end = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let nanos_per_unit = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return None,
        };

        total_nanos += amount * nanos_per_unit;
        rest = next;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}
