use crate::config::types::{Config, ExtractorConfig, FetcherConfig, OutputConfig, PaginationConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_pagination_config(&config.pagination)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_extractor_config(&config.extractor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates pagination configuration
pub fn validate_pagination_config(config: &PaginationConfig) -> Result<(), ConfigError> {
    if config.selectors().is_empty() {
        return Err(ConfigError::Validation(
            "next_button_selector cannot be empty".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.wait_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout must be >= 100ms, got {}ms",
            config.wait_timeout
        )));
    }

    if config.content_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "content_selector cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 64, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates semantic extractor configuration
fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    if config.provider.trim().is_empty() || config.model_name().is_empty() {
        return Err(ConfigError::Validation(format!(
            "provider must name a model, got '{}'",
            config.provider
        )));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::Validation(format!("Invalid base_url: {}", e)))?;

    if config.chunk_token_threshold < 100 {
        return Err(ConfigError::Validation(format!(
            "chunk_token_threshold must be >= 100, got {}",
            config.chunk_token_threshold
        )));
    }

    if !(0.0..0.5).contains(&config.overlap_rate) {
        return Err(ConfigError::Validation(format!(
            "overlap_rate must be in [0, 0.5), got {}",
            config.overlap_rate
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    if config.filename_prefix.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "filename_prefix cannot contain path separators, got '{}'",
            config.filename_prefix
        )));
    }

    Ok(())
}
