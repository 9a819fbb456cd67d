use std::time::Duration;

use crate::error::ConfigError;

pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
pub const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";
pub const HF_TOKEN_VAR: &str = "HF_API_TOKEN";

/// Use the configured value if present, otherwise read `env_var`.
/// Blank values count as missing.
pub fn resolve_credential(
    configured: Option<&str>,
    env_var: &'static str,
) -> Result<String, ConfigError> {
    if let Some(value) = configured.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(ConfigError::MissingCredential(env_var)),
    }
}

/// Shared HTTP client construction for provider adapters.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Invalid(format!("Failed to create HTTP client: {e}")))
}
