use arachne::config::{load_config, load_config_with_hash};
use arachne::{ConfigError, Orchestrator};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
[crawler]
max-concurrent = 8
retry-attempts = 2
retry-delay-ms = 250
max-pages = 25

[crawler.domain-rate-limit]
"slow.example.com" = 2

[fetch]
user-agent = "test-agent/1.0"

[output]
output-file = "out.json"
enable-metrics = false
"#,
    );

    let (config, hash) = load_config_with_hash(file.path()).unwrap();

    assert_eq!(config.crawler.max_concurrent, 8);
    assert_eq!(config.crawler.retry_attempts, 2);
    assert_eq!(config.crawler.retry_delay_ms, 250);
    assert_eq!(config.crawler.max_pages, 25);
    assert_eq!(config.crawler.domain_rate_limit.get("slow.example.com"), Some(&2));
    assert_eq!(config.fetch.user_agent, "test-agent/1.0");
    assert_eq!(config.output.output_file, "out.json");
    assert!(!config.output.enable_metrics);
    // Untouched keys keep their defaults
    assert_eq!(config.crawler.circuit_breaker_threshold, 3);
    assert_eq!(hash.len(), 64);

    assert!(Orchestrator::new(&config).is_ok());
}

#[test]
fn test_invalid_config_is_rejected() {
    let file = write_config(
        r#"
[crawler]
max-concurrent = 0
"#,
    );

    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_malformed_toml_is_rejected() {
    let file = write_config("[crawler\nmax-concurrent = 3");
    assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
}
