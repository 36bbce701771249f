//! Configuration module for Arachne
//!
//! This module handles loading TOML configuration files, applying `SCRAPER_*`
//! environment overrides, and validating the result.
//!
//! # Example
//!
//! ```no_run
//! use arachne::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("arachne.toml")).unwrap();
//! println!("Scraper will use {} slots", config.crawler.max_concurrent);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetchConfig, OutputConfig};

// Re-export loading functions
pub use env::{apply_env_overrides, parse_duration};
pub use parser::{
    compute_config_hash, config_from_env, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
