use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use sentix_models::{PipelineConfig, SymbolSentimentSummary};
use sentix_providers::{NewsSource, SentimentClassifier};
use sentix_store::SentimentStore;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Articles requested per symbol.
    pub news_limit: usize,
    /// Symbols processed at once. 1 is sequential.
    pub max_concurrent_symbols: usize,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            news_limit: 20,
            max_concurrent_symbols: 1,
        }
    }
}

impl RefreshOptions {
    pub fn from_config(news_limit: usize, pipeline: &PipelineConfig) -> Self {
        Self {
            news_limit,
            max_concurrent_symbols: pipeline.max_concurrent_symbols,
        }
    }
}

/// Per-symbol outcome counters, logged when a symbol finishes.
#[derive(Debug, Default)]
struct ArticleTally {
    fetched: usize,
    inserted: usize,
    duplicates: usize,
    scored: usize,
    unscored: usize,
    failed: usize,
}

/// Everything one symbol's refresh needs. Cheap to clone into spawned tasks.
#[derive(Clone)]
struct SymbolWorker {
    news: Arc<dyn NewsSource>,
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<SentimentStore>,
    aggregator: Aggregator,
    news_limit: usize,
}

impl SymbolWorker {
    /// Refresh one symbol, turning any symbol-level failure into a placeholder.
    async fn run(&self, symbol: &str) -> SymbolSentimentSummary {
        let start = Instant::now();
        match self.process(symbol).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    symbol,
                    error = %e,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Symbol refresh failed"
                );
                SymbolSentimentSummary::placeholder(symbol, Utc::now())
            }
        }
    }

    async fn process(&self, symbol: &str) -> Result<SymbolSentimentSummary, PipelineError> {
        if symbol.is_empty() {
            return Err(PipelineError::InvalidSymbol(symbol.to_string()));
        }
        let start = Instant::now();
        let asset_type = self.store.asset_type_for(symbol)?;
        let candidates = self
            .news
            .fetch_news(symbol, self.news_limit, asset_type)
            .await?;

        let mut tally = ArticleTally {
            fetched: candidates.len(),
            ..ArticleTally::default()
        };

        for mut candidate in candidates {
            candidate.symbol = symbol.to_string();
            let article = match self.store.insert_if_absent(&candidate.into_new_article()) {
                Ok(Some(article)) => article,
                Ok(None) => {
                    tally.duplicates += 1;
                    continue;
                }
                Err(e) => {
                    warn!(symbol, error = %e, "Article insert failed, skipping");
                    tally.failed += 1;
                    continue;
                }
            };
            tally.inserted += 1;

            match self.classifier.classify(&article.raw_text).await {
                Ok(classification) => {
                    if let Err(e) = self.store.insert_score(article.id, &classification) {
                        warn!(
                            symbol,
                            article_id = article.id,
                            error = %e,
                            "Score insert failed, article left unscored"
                        );
                        tally.unscored += 1;
                        continue;
                    }
                    debug!(
                        symbol,
                        article_id = article.id,
                        label = %classification.label,
                        score = classification.score,
                        "Article scored"
                    );
                    tally.scored += 1;
                }
                Err(e) => {
                    warn!(
                        symbol,
                        article_id = article.id,
                        error = %e,
                        "Classification failed, article left unscored"
                    );
                    tally.unscored += 1;
                }
            }
        }

        let summary = self.aggregator.summarize(symbol)?;
        info!(
            symbol,
            source = self.news.name(),
            fetched = tally.fetched,
            inserted = tally.inserted,
            duplicates = tally.duplicates,
            scored = tally.scored,
            unscored = tally.unscored,
            failed = tally.failed,
            sentiment_index = summary.sentiment_index,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Symbol refreshed"
        );
        Ok(summary)
    }
}

/// Drives fetch, dedupe, classification and aggregation across a batch of symbols.
pub struct RefreshPipeline {
    worker: SymbolWorker,
    options: RefreshOptions,
}

impl RefreshPipeline {
    pub fn new(
        news: Arc<dyn NewsSource>,
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<SentimentStore>,
        options: RefreshOptions,
    ) -> Self {
        let aggregator = Aggregator::new(Arc::clone(&store));
        Self {
            worker: SymbolWorker {
                news,
                classifier,
                store,
                aggregator,
                news_limit: options.news_limit,
            },
            options,
        }
    }

    pub fn store(&self) -> &Arc<SentimentStore> {
        &self.worker.store
    }

    pub fn options(&self) -> RefreshOptions {
        self.options
    }

    /// Refresh each symbol and return one summary per input, in input order.
    ///
    /// Never fails as a whole: a symbol whose fetch, asset type lookup or
    /// summary read fails gets a placeholder summary. An article whose insert
    /// fails is skipped, and one whose classification or score insert fails
    /// is left unscored.
    pub async fn refresh(&self, symbols: &[String]) -> Vec<SymbolSentimentSummary> {
        let run_id = Uuid::new_v4();
        let symbols: Vec<String> = symbols.iter().map(|s| normalize(s)).collect();
        let span = info_span!("refresh", run_id = %run_id, symbols = symbols.len());

        async {
            let start = Instant::now();
            info!(
                source = self.worker.news.name(),
                classifier = self.worker.classifier.name(),
                max_concurrent = self.options.max_concurrent_symbols,
                "Starting refresh"
            );

            let summaries = if self.options.max_concurrent_symbols > 1 && symbols.len() > 1 {
                self.refresh_concurrent(&symbols).await
            } else {
                self.refresh_sequential(&symbols).await
            };

            let empty = summaries.iter().filter(|s| s.articles.is_empty()).count();
            info!(
                summaries = summaries.len(),
                without_articles = empty,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Refresh complete"
            );
            summaries
        }
        .instrument(span)
        .await
    }

    async fn refresh_sequential(&self, symbols: &[String]) -> Vec<SymbolSentimentSummary> {
        let mut summaries = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let summary = self
                .worker
                .run(symbol)
                .instrument(info_span!("symbol", symbol = %symbol))
                .await;
            summaries.push(summary);
        }
        summaries
    }

    async fn refresh_concurrent(&self, symbols: &[String]) -> Vec<SymbolSentimentSummary> {
        let permits = Arc::new(Semaphore::new(self.options.max_concurrent_symbols));
        let mut tasks = JoinSet::new();

        for (index, symbol) in symbols.iter().enumerate() {
            let worker = self.worker.clone();
            let permits = Arc::clone(&permits);
            let symbol = symbol.clone();
            let span = info_span!("symbol", symbol = %symbol);
            tasks.spawn(
                async move {
                    // The semaphore is never closed.
                    let _permit = permits.acquire_owned().await.ok();
                    (index, worker.run(&symbol).await)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<SymbolSentimentSummary>> = vec![None; symbols.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, summary)) => slots[index] = Some(summary),
                Err(e) => error!(error = %e, "Symbol task panicked"),
            }
        }

        slots
            .into_iter()
            .zip(symbols)
            .map(|(slot, symbol)| {
                slot.unwrap_or_else(|| SymbolSentimentSummary::placeholder(symbol, Utc::now()))
            })
            .collect()
    }

    /// Refresh every watchlist symbol.
    pub async fn refresh_watchlist(&self) -> Result<Vec<SymbolSentimentSummary>, PipelineError> {
        let symbols = self.watchlist_symbols()?;
        if symbols.is_empty() {
            info!("Watchlist is empty, nothing to refresh");
            return Ok(Vec::new());
        }
        Ok(self.refresh(&symbols).await)
    }

    /// Summaries for `symbols`, or for the whole watchlist when `None` or empty.
    /// Read-only: nothing is fetched or classified.
    pub fn summarize(
        &self,
        symbols: Option<&[String]>,
    ) -> Result<Vec<SymbolSentimentSummary>, PipelineError> {
        Ok(self.worker.aggregator.summarize_many(symbols)?)
    }

    fn watchlist_symbols(&self) -> Result<Vec<String>, PipelineError> {
        Ok(self
            .worker
            .store
            .list_watchlist()?
            .into_iter()
            .map(|entry| entry.symbol)
            .collect())
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
