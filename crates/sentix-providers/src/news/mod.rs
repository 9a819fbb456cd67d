pub mod alpha_vantage;
pub mod lookup;
pub mod newsapi;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sentix_models::{AssetType, NewsCandidate, NewsConfig, NewsProviderKind};

use crate::credentials::{resolve_credential, ALPHA_VANTAGE_KEY_VAR, NEWS_API_KEY_VAR};
use crate::error::{ConfigError, ProviderError};

/// Both providers reject page sizes above this.
pub const MAX_PAGE_SIZE: usize = 50;

/// A source of news articles for a symbol.
///
/// Implementations normalize provider output into `NewsCandidate`s and report
/// provider-side errors (including rate-limit notices) as `ProviderError`
/// rather than as an empty result.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<NewsCandidate>, ProviderError>;
}

/// Create the configured news source. Fails if its API key is missing.
pub fn build_news_source(config: &NewsConfig) -> Result<Arc<dyn NewsSource>, ConfigError> {
    let timeout = Duration::from_secs(config.timeout_seconds);
    match config.provider {
        NewsProviderKind::AlphaVantage => {
            let api_key = resolve_credential(config.api_key.as_deref(), ALPHA_VANTAGE_KEY_VAR)?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| alpha_vantage::ALPHA_VANTAGE_URL.to_string());
            Ok(Arc::new(alpha_vantage::AlphaVantageSource::new(
                api_key, base_url, timeout,
            )?))
        }
        NewsProviderKind::NewsApi => {
            let api_key = resolve_credential(config.api_key.as_deref(), NEWS_API_KEY_VAR)?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| newsapi::NEWS_API_URL.to_string());
            Ok(Arc::new(newsapi::NewsApiSource::new(
                api_key, base_url, timeout,
            )?))
        }
    }
}

/// Treat blank provider strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
