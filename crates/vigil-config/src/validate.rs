//! Post-merge validation.

use std::net::SocketAddr;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Provider family names accepted in `providers.disabled`.
pub const KNOWN_FAMILIES: &[&str] = &[
    "anthropic",
    "gemini",
    "openai",
    "deepseek",
    "groq",
    "openrouter",
    "mistral",
    "xai",
];

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_limits(config)?;
    validate_approval(config)?;
    validate_server(config)?;
    validate_providers(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_limits(config: &Config) -> ConfigResult<()> {
    let l = &config.limits;
    let checks = [
        ("limits.max_steps", l.max_steps == 0),
        ("limits.char_budget", l.char_budget == 0),
        ("limits.read_char_limit", l.read_char_limit == 0),
        ("limits.command_timeout_secs", l.command_timeout_secs == 0),
        ("limits.max_output_bytes", l.max_output_bytes == 0),
    ];
    for (field, is_zero) in checks {
        if is_zero {
            return Err(invalid(field, "must be greater than zero"));
        }
    }
    Ok(())
}

fn validate_approval(config: &Config) -> ConfigResult<()> {
    let a = &config.approval;
    if a.request_ttl_secs == 0 {
        return Err(invalid("approval.request_ttl_secs", "must be greater than zero"));
    }
    if a.token_ttl_secs == 0 {
        return Err(invalid("approval.token_ttl_secs", "must be greater than zero"));
    }
    if a.sweep_interval_secs == 0 {
        return Err(invalid("approval.sweep_interval_secs", "must be greater than zero"));
    }
    Ok(())
}

fn validate_server(config: &Config) -> ConfigResult<()> {
    config
        .server
        .bind
        .parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| invalid("server.bind", format!("'{}' is not a socket address: {e}", config.server.bind)))
}

fn validate_providers(config: &Config) -> ConfigResult<()> {
    let p = &config.providers;
    if let Some(unknown) = p
        .disabled
        .iter()
        .find(|d| !KNOWN_FAMILIES.contains(&d.to_ascii_lowercase().as_str()))
    {
        return Err(invalid(
            "providers.disabled",
            format!("unknown provider '{unknown}'; expected one of: {}", KNOWN_FAMILIES.join(", ")),
        ));
    }
    if p.max_tokens == 0 {
        return Err(invalid("providers.max_tokens", "must be greater than zero"));
    }
    if !(0.0..=1.0).contains(&p.temperature) {
        return Err(invalid(
            "providers.temperature",
            format!("{} is out of range; must be between 0.0 and 1.0", p.temperature),
        ));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if l.level.trim().is_empty() {
        return Err(invalid("logging.level", "must not be empty"));
    }
    if !LOG_FORMATS.contains(&l.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!("unknown format '{}'; expected one of: {}", l.format, LOG_FORMATS.join(", ")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::default();
        config.limits.max_steps = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "limits.max_steps");

        let mut config = Config::default();
        config.limits.max_output_bytes = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "limits.max_output_bytes");
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = Config::default();
        config.approval.token_ttl_secs = 0;
        assert_eq!(field_of(validate(&config).unwrap_err()), "approval.token_ttl_secs");
    }

    #[test]
    fn test_bad_bind_rejected() {
        let mut config = Config::default();
        config.server.bind = "localhost".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "server.bind");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = Config::default();
        config.providers.disabled = vec!["OpenAI".to_owned(), "acme".to_owned()];
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("acme"));
    }

    #[test]
    fn test_temperature_range() {
        let mut config = Config::default();
        config.providers.temperature = 1.5;
        assert_eq!(field_of(validate(&config).unwrap_err()), "providers.temperature");
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config).unwrap_err()), "logging.format");
    }
}
