use thiserror::Error;

/// Failure fetching news for a symbol. Fatal for that symbol only.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} HTTP error ({status}): {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} rate limit: {message}")]
    RateLimited {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} notice: {message}")]
    Notice {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} response could not be decoded: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}

/// Failure classifying one article. Fatal for that article only.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Inference API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("Inference request failed: {0}")]
    Transport(String),

    #[error("Failed to analyze sentiment after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("Unexpected inference response: {0}")]
    Decode(String),
}

/// The pipeline cannot be built. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
