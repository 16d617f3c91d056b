use crate::config::types::{ApiConfig, Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::project::is_project;
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_api_config(&config.api)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.projects.is_empty() {
        return Err(ConfigError::Validation(
            "projects must list at least one project".to_string(),
        ));
    }

    for project in &config.projects {
        if !is_project(project) {
            return Err(ConfigError::UnknownProject(project.clone()));
        }
    }

    if config.retention_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "retention_hours must be >= 1, got {}",
            config.retention_hours
        )));
    }

    if config.write_concurrency < 1 || config.write_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "write_concurrency must be between 1 and 100, got {}",
            config.write_concurrency
        )));
    }

    if !config.rate_limit_rps.is_finite() || config.rate_limit_rps <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_rps must be a positive number, got {}",
            config.rate_limit_rps
        )));
    }

    if Duration::try_from_secs_f64(1.0 / config.rate_limit_rps).is_err() {
        return Err(ConfigError::Validation(format!(
            "rate_limit_rps {} is too small",
            config.rate_limit_rps
        )));
    }

    if config.rate_limit_burst < 1 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_burst must be >= 1, got {}",
            config.rate_limit_burst
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates upstream endpoints
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    Url::parse(&config.pageviews_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid pageviews_url: {}", e)))?;

    if !config.project_url_template.contains("{project}") {
        return Err(ConfigError::Validation(format!(
            "project_url_template must contain '{{project}}', got '{}'",
            config.project_url_template
        )));
    }

    let sample = config.project_url_template.replace("{project}", "en");
    Url::parse(&sample)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid project_url_template: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
