use serde::{Deserialize, Serialize};

/// Which news provider backs the pipeline. Selected once at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NewsProviderKind {
    #[default]
    AlphaVantage,
    NewsApi,
}

/// Top-level configuration for sentix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SentixConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/sentiment.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsConfig {
    #[serde(default)]
    pub provider: NewsProviderKind,
    /// Maximum articles requested per symbol. Providers cap this at 50.
    #[serde(default = "default_news_limit")]
    pub limit: usize,
    /// Per-request timeout in seconds.
    #[serde(default = "default_news_timeout")]
    pub timeout_seconds: u64,
    /// API key. Falls back to `ALPHA_VANTAGE_API_KEY` / `NEWS_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the provider endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            provider: NewsProviderKind::default(),
            limit: default_news_limit(),
            timeout_seconds: default_news_timeout(),
            api_key: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierConfig {
    /// Hosted model id, appended to `base_url`.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_classifier_timeout")]
    pub timeout_seconds: u64,
    /// Total attempts per classification, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Bearer token. Falls back to `HF_API_TOKEN`.
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            timeout_seconds: default_classifier_timeout(),
            max_attempts: default_max_attempts(),
            api_token: None,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Symbols refreshed in parallel. 1 keeps the run sequential.
    #[serde(default = "default_max_concurrent_symbols")]
    pub max_concurrent_symbols: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_symbols: default_max_concurrent_symbols(),
        }
    }
}

fn default_news_limit() -> usize {
    20
}
fn default_news_timeout() -> u64 {
    15
}
fn default_model() -> String {
    "ProsusAI/finbert".to_string()
}
fn default_classifier_timeout() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_max_concurrent_symbols() -> usize {
    1
}
