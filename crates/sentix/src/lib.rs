//! sentix - news sentiment aggregation for a watchlist of market symbols
//!
//! Fetches news per symbol from a configured provider, deduplicates it against
//! previously seen articles, classifies new articles with a hosted sentiment
//! model and aggregates the results into a per-symbol sentiment index.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use sentix::models::{SentixConfig, SymbolSentimentSummary};
//! use sentix::pipeline::RefreshPipeline;
//! use sentix::store::SentimentStore;
//! ```

pub use sentix_models as models;
pub use sentix_pipeline as pipeline;
pub use sentix_providers as providers;
pub use sentix_store as store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use sentix_models::{SentixConfig, SymbolSentimentSummary};
use sentix_pipeline::{RefreshOptions, RefreshPipeline};
use sentix_providers::{build_classifier, build_news_source};
use sentix_store::SentimentStore;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Respects `RUST_LOG`; logs go to stderr.
pub fn init_tracing(json_logs: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);
    if json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Read and parse a TOML configuration file.
pub fn load_config<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {path}"))?;
    toml::from_str(&raw).with_context(|| format!("Failed to parse config: {path}"))
}

/// Open the configured database, creating its directory if needed.
pub fn open_store(config: &SentixConfig) -> anyhow::Result<Arc<SentimentStore>> {
    let path = &config.store.sqlite_path;
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let store =
        SentimentStore::open(path).with_context(|| format!("Failed to open database: {path}"))?;
    Ok(Arc::new(store))
}

/// Build a RefreshPipeline from configuration.
///
/// Fails if a provider credential is missing; nothing is fetched in that case.
pub fn build_pipeline(config: &SentixConfig) -> anyhow::Result<RefreshPipeline> {
    let store = open_store(config)?;
    build_pipeline_with_store(config, store)
}

/// Like [`build_pipeline`] but over an already-open store.
pub fn build_pipeline_with_store(
    config: &SentixConfig,
    store: Arc<SentimentStore>,
) -> anyhow::Result<RefreshPipeline> {
    let news = build_news_source(&config.news).context("Failed to configure news source")?;
    let classifier =
        build_classifier(&config.classifier).context("Failed to configure classifier")?;
    Ok(RefreshPipeline::new(
        news,
        classifier,
        store,
        RefreshOptions::from_config(config.news.limit, &config.pipeline),
    ))
}

/// Refresh `symbols`, or the whole watchlist when `symbols` is empty.
pub async fn refresh(
    pipeline: &RefreshPipeline,
    symbols: &[String],
) -> anyhow::Result<Vec<SymbolSentimentSummary>> {
    if symbols.is_empty() {
        return pipeline
            .refresh_watchlist()
            .await
            .context("Failed to refresh watchlist");
    }
    Ok(pipeline.refresh(symbols).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentix_models::{ClassifierConfig, NewsConfig, NewsProviderKind, StoreConfig};

    fn config(dir: &Path) -> SentixConfig {
        SentixConfig {
            store: StoreConfig {
                sqlite_path: dir.join("nested/db/sentiment.db").display().to_string(),
            },
            news: NewsConfig {
                provider: NewsProviderKind::NewsApi,
                api_key: Some("news-key".to_string()),
                ..NewsConfig::default()
            },
            classifier: ClassifierConfig {
                api_token: Some("hf-token".to_string()),
                ..ClassifierConfig::default()
            },
            pipeline: Default::default(),
        }
    }

    #[test]
    fn build_pipeline_creates_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let pipeline = build_pipeline(&config).unwrap();
        assert!(dir.path().join("nested/db/sentiment.db").exists());
        assert_eq!(pipeline.options().news_limit, 20);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let err = load_config::<SentixConfig>("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn load_config_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentix.toml");
        std::fs::write(
            &path,
            "[store]\nsqlite_path = \"x.db\"\n\n[news]\nprovider = \"newsapi\"\nlimit = 7\n",
        )
        .unwrap();
        let config: SentixConfig = load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.news.provider, NewsProviderKind::NewsApi);
        assert_eq!(config.news.limit, 7);
    }
}
