//! In-process stand-ins for the news source and classifier.
//!
//! Used by this crate's tests and by the loader and CLI tests to drive a
//! `RefreshPipeline` without any network access.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sentix_models::{AssetType, Classification, NewsCandidate, SentimentLabel};
use sentix_providers::{ClassifierError, NewsSource, ProviderError, SentimentClassifier};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a candidate with a headline and URL only.
pub fn candidate(symbol: &str, headline: &str, url: &str) -> NewsCandidate {
    NewsCandidate {
        symbol: symbol.to_string(),
        headline: headline.to_string(),
        description: None,
        source: Some("Test Wire".to_string()),
        url: Some(url.to_string()),
        published_at: None,
    }
}

/// News source with canned per-symbol responses. Unknown symbols return no articles.
#[derive(Default)]
pub struct MockNewsSource {
    responses: HashMap<String, Result<Vec<NewsCandidate>, String>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Option<AssetType>)>>,
}

impl MockNewsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_articles(mut self, symbol: &str, articles: Vec<NewsCandidate>) -> Self {
        self.responses.insert(symbol.to_string(), Ok(articles));
        self
    }

    pub fn failing_for(mut self, symbol: &str, message: &str) -> Self {
        self.responses
            .insert(symbol.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(symbol, asset_type)` for every fetch, in call order.
    pub fn requests(&self) -> Vec<(String, Option<AssetType>)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    fn name(&self) -> &str {
        "mock-news"
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
        asset_type: Option<AssetType>,
    ) -> Result<Vec<NewsCandidate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.requests).push((symbol.to_string(), asset_type));
        match self.responses.get(symbol) {
            Some(Ok(articles)) => Ok(articles.iter().take(limit).cloned().collect()),
            Some(Err(message)) => Err(ProviderError::Api {
                provider: "mock-news",
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

/// Classifier that labels text by keyword.
///
/// Rules are checked in insertion order against the lowercased text; the
/// first match wins. Text containing a `failing_on` word fails. Scripted
/// failures (`flaky`) are consumed first, one per call.
pub struct MockClassifier {
    default: Classification,
    rules: Vec<(String, Classification)>,
    failing_words: Vec<String>,
    scripted_failures: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl MockClassifier {
    pub fn always(label: SentimentLabel, score: f64) -> Self {
        Self {
            default: Classification { label, score },
            rules: Vec::new(),
            failing_words: Vec::new(),
            scripted_failures: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_keyword(mut self, word: &str, label: SentimentLabel, score: f64) -> Self {
        self.rules
            .push((word.to_lowercase(), Classification { label, score }));
        self
    }

    pub fn failing_on(mut self, word: &str) -> Self {
        self.failing_words.push(word.to_lowercase());
        self
    }

    /// Fail the next `count` calls with a transport error.
    pub fn flaky(self, count: usize) -> Self {
        {
            let mut scripted = lock(&self.scripted_failures);
            for _ in 0..count {
                scripted.push_back("connection reset by peer".to_string());
            }
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.scripted_failures).pop_front() {
            return Err(ClassifierError::Transport(message));
        }

        let text = text.to_lowercase();
        if self.failing_words.iter().any(|w| text.contains(w.as_str())) {
            return Err(ClassifierError::Status {
                status: 500,
                body: "inference backend error".to_string(),
            });
        }
        Ok(self
            .rules
            .iter()
            .find(|(word, _)| text.contains(word.as_str()))
            .map(|(_, classification)| *classification)
            .unwrap_or(self.default))
    }
}
