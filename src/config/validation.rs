use crate::config::types::{Config, CrawlerConfig, SinkConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_sink_config(&config.sink)?;
    Ok(())
}

/// Validates crawler configuration
///
/// Zero concurrency, worker or interval values would stall or panic a crawl, so they are rejected
/// here rather than at use.
pub fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seeds {
        validate_seed(seed)?;
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.fetch_concurrency < 1 || config.fetch_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_concurrency must be between 1 and 100, got {}",
            config.fetch_concurrency
        )));
    }

    if config.parse_workers < 1 {
        return Err(ConfigError::Validation(format!(
            "parse_workers must be >= 1, got {}",
            config.parse_workers
        )));
    }

    if config.stats_interval_secs < 1 {
        return Err(ConfigError::Validation(
            "stats_interval_secs must be >= 1".to_string(),
        ));
    }

    if config.snippet_cap < 1 {
        return Err(ConfigError::Validation(
            "snippet_cap must be >= 1".to_string(),
        ));
    }

    if config.fetch_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates a single seed URL
///
/// Seeds must parse as absolute URLs and use an http or https scheme.
pub fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.database_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
