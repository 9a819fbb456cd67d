use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::StatusCode;
use sentix_models::{AssetType, NewsCandidate};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::lookup::{crypto_ticker, ForexPair};
use super::{non_empty, NewsSource, MAX_PAGE_SIZE};
use crate::credentials::http_client;
use crate::error::{ConfigError, ProviderError};

pub const ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

const PROVIDER: &str = "alphavantage";
const TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Ticker-based news source backed by the Alpha Vantage `NEWS_SENTIMENT` function.
pub struct AlphaVantageSource {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    in_flight: Mutex<()>,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(default)]
    feed: Vec<FeedItem>,
}

impl FeedResponse {
    fn into_feed(self) -> Result<Vec<FeedItem>, ProviderError> {
        if let Some(message) = self.error_message {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                message,
            });
        }
        if let Some(message) = self.note {
            return Err(ProviderError::RateLimited {
                provider: PROVIDER,
                message,
            });
        }
        if let Some(message) = self.information {
            return Err(ProviderError::Notice {
                provider: PROVIDER,
                message,
            });
        }
        Ok(self.feed)
    }
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: Option<String>,
    summary: Option<String>,
    source: Option<String>,
    url: Option<String>,
    time_published: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
}

impl FeedItem {
    fn text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.summary.as_deref().unwrap_or_default()
        )
    }

    fn into_candidate(self, symbol: &str) -> NewsCandidate {
        let source = non_empty(self.source).or_else(|| {
            let joined = self.authors.join(", ");
            non_empty(Some(joined))
        });
        NewsCandidate {
            symbol: symbol.to_string(),
            headline: self.title.unwrap_or_default(),
            description: non_empty(self.summary),
            source,
            url: non_empty(self.url),
            published_at: self.time_published.as_deref().and_then(parse_time_published),
        }
    }
}

fn parse_time_published(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, TIME_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

impl AlphaVantageSource {
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

    async fn query(&self, params: &[(&str, String)]) -> Result<Vec<FeedItem>, ProviderError> {
        let mut query: Vec<(&str, String)> = vec![
            ("function", "NEWS_SENTIMENT".to_string()),
            ("sort", "LATEST".to_string()),
            ("apikey", self.api_key.clone()),
        ];
        query.extend(params.iter().cloned());

        let (status, body) = {
            let _guard = self.in_flight.lock().await;
            let response = self
                .client
                .get(&self.base_url)
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

        let payload: FeedResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
                provider: PROVIDER,
                message: e.to_string(),
            })?;
        payload.into_feed()
    }

    async fn fetch_tickers(
        &self,
        symbol: &str,
        tickers: String,
        limit: usize,
    ) -> Result<Vec<NewsCandidate>, ProviderError> {
        let items = self
            .query(&[("tickers", tickers), ("limit", limit.to_string())])
            .await?;
        Ok(items
            .into_iter()
            .map(|item| item.into_candidate(symbol))
            .collect())
    }

    async fn fetch_forex(
        &self,
        symbol: &str,
        pair: &ForexPair,
        limit: usize,
    ) -> Result<Vec<NewsCandidate>, ProviderError> {
        let items = self
            .query(&[("topics", "forex".to_string()), ("limit", limit.to_string())])
            .await?;

        if !items.is_empty() {
            return Ok(items
                .into_iter()
                .filter(|item| pair.is_mentioned_in(&item.text()))
                .map(|item| item.into_candidate(symbol))
                .collect());
        }

        let wide_limit = (limit * 3).min(MAX_PAGE_SIZE);
        debug!(symbol, wide_limit, "Forex topic feed empty, retrying without topic");
        let items = self.query(&[("limit", wide_limit.to_string())]).await?;
        Ok(items
            .into_iter()
            .filter(|item| pair.is_loosely_mentioned_in(&item.text()))
            .take(limit)
            .map(|item| item.into_candidate(symbol))
            .collect())
    }
}

fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport {
        provider: PROVIDER,
        message: e.to_string(),
    }
}

#[async_trait]
impl NewsSource for AlphaVantageSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<NewsCandidate>, ProviderError> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        match asset_type {
            Some(AssetType::Forex) => match ForexPair::parse(symbol) {
                Some(pair) => self.fetch_forex(symbol, &pair, limit).await,
                None => {
                    warn!(symbol, "Not a six-letter currency pair, querying as ticker");
                    self.fetch_tickers(symbol, symbol.to_string(), limit).await
                }
            },
            Some(AssetType::Crypto) => {
                self.fetch_tickers(symbol, crypto_ticker(symbol), limit)
                    .await
            }
            Some(AssetType::Stock) | None => {
                self.fetch_tickers(symbol, symbol.to_string(), limit).await
            }
        }
    }
}
