use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use sentix_models::{AssetType, NewsCandidate};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::lookup::{crypto_name, ForexPair};
use super::{non_empty, NewsSource, MAX_PAGE_SIZE};
use crate::credentials::http_client;
use crate::error::{ConfigError, ProviderError};

pub const NEWS_API_URL: &str = "https://newsapi.org/v2";

const PROVIDER: &str = "newsapi";

/// Full-text news source backed by NewsAPI `/everything`.
pub struct NewsApiSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    in_flight: Mutex<()>,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    description: Option<String>,
    source: Option<ArticleSource>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl NewsApiArticle {
    fn into_candidate(self, symbol: &str) -> NewsCandidate {
        NewsCandidate {
            symbol: symbol.to_string(),
            headline: self.title.unwrap_or_default(),
            description: non_empty(self.description),
            source: non_empty(self.source.and_then(|s| s.name)),
            url: non_empty(self.url),
            published_at: self.published_at,
        }
    }
}

/// Search phrase for a symbol of the given asset type.
pub fn search_query(symbol: &str, asset_type: Option<AssetType>) -> String {
    match asset_type {
        Some(AssetType::Crypto) => match crypto_name(symbol) {
            Some(name) => format!("{symbol} OR {name}"),
            None => symbol.to_string(),
        },
        Some(AssetType::Forex) => match ForexPair::parse(symbol) {
            Some(pair) => format!("{}/{} forex", pair.base, pair.quote),
            None => format!("{symbol} forex"),
        },
        Some(AssetType::Stock) | None => symbol.to_string(),
    }
}

impl NewsApiSource {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.into(),
            base_url: base_url.into(),
            in_flight: Mutex::new(()),
        })
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider: PROVIDER,
        message: e.to_string(),
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<NewsCandidate>, ProviderError> {
        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        let query = [
            ("q", search_query(symbol, asset_type)),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("apiKey", self.api_key.clone()),
        ];

        let (status, body) = {
            let _guard = self.in_flight.lock().await;
            let response = self
                .client
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(transport)?;
            let status = response.status();
            let body = response.text().await.map_err(transport)?;
            (status, body)
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER,
                message: body,
            });
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body,
            });
        }

        let payload: EverythingResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                message: e.to_string(),
            })?;
        if payload.status != "ok" {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                message: payload
                    .message
                    .unwrap_or_else(|| format!("returned status: {}", payload.status)),
            });
        }

        Ok(payload
            .articles
            .into_iter()
            .map(|article| article.into_candidate(symbol))
            .collect())
    }
}
