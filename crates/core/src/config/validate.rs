use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Remote base URL is an absolute http(s) URL
/// - Remote timeout is not 0
/// - Server port and upload limit are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.remote.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "remote.base_url cannot be empty".to_string(),
        ));
    }

    let url = reqwest::Url::parse(base_url).map_err(|e| {
        ConfigError::ValidationError(format!("remote.base_url is not a valid URL: {}", e))
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::ValidationError(format!(
            "remote.base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.remote.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "remote.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    Ok(())
}
