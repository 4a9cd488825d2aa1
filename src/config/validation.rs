use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid lookup base URL '{url}', expected 'http://' or 'https://'")]
    InvalidBaseUrl { url: String },

    #[error("Lookup user agent must not be empty")]
    EmptyUserAgent,

    #[error("Timeout must be positive: {field}")]
    ZeroTimeout { field: String },

    #[error("Backoff initial_delay must be positive")]
    ZeroInitialDelay,

    #[error("Backoff max_delay ({max}) is shorter than initial_delay ({initial})")]
    MaxDelayBelowInitial { initial: String, max: String },

    #[error("Output path must not be empty")]
    EmptyOutputPath,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_lookup(config)?;
    validate_backoff(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_lookup(config: &Config) -> Result<(), ValidationError> {
    let lookup = &config.lookup;

    let url = lookup.base_url.trim();
    let has_host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ValidationError::InvalidBaseUrl {
            url: lookup.base_url.clone(),
        });
    }

    if lookup.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }

    for (field, value) in [
        ("lookup.connect_timeout", lookup.connect_timeout),
        ("lookup.request_timeout", lookup.request_timeout),
    ] {
        if value.is_zero() {
            return Err(ValidationError::ZeroTimeout {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

/// Initial delay must be positive and not exceed the cap
fn validate_backoff(config: &Config) -> Result<(), ValidationError> {
    let backoff = &config.backoff;

    if backoff.initial_delay.is_zero() {
        return Err(ValidationError::ZeroInitialDelay);
    }

    if backoff.max_delay < backoff.initial_delay {
        return Err(ValidationError::MaxDelayBelowInitial {
            initial: backoff.initial_delay.to_string(),
            max: backoff.max_delay.to_string(),
        });
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<(), ValidationError> {
    if config.output.path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyOutputPath);
    }

    Ok(())
}
