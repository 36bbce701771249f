use crate::config::types::{Config, CrawlerConfig, FetchConfig, OutputConfig};
use crate::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetch_config(&config.fetch)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be positive, got {}",
            config.max_concurrent
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be positive".to_string(),
        ));
    }

    if config.total_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "total_timeout must be positive".to_string(),
        ));
    }

    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be at least 1, got {}",
            config.retry_attempts
        )));
    }

    if config.circuit_breaker_threshold < 1 {
        return Err(ConfigError::Validation(format!(
            "circuit_breaker_threshold must be at least 1, got {}",
            config.circuit_breaker_threshold
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be at least 1, got {}",
            config.max_pages
        )));
    }

    validate_domain_limits(config)?;

    Ok(())
}

/// Validates the per-domain concurrency caps
fn validate_domain_limits(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (domain, limit) in &config.domain_rate_limit {
        if domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "domain_rate_limit keys cannot be empty".to_string(),
            ));
        }

        if *limit < 1 {
            return Err(ConfigError::Validation(format!(
                "domain_rate_limit for '{}' must be at least 1, got {}",
                domain, limit
            )));
        }
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        return Err(ConfigError::Validation(format!(
            "invalid log_level: {}, must be one of: {}",
            config.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.output_file.is_empty() {
        return Err(ConfigError::Validation(
            "output_file cannot be empty".to_string(),
        ));
    }

    Ok(())
}
