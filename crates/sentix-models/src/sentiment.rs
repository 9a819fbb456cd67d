use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Map a raw classifier label onto the three canonical labels.
    ///
    /// Matching is a case-insensitive substring test, so `"POSITIVE"`,
    /// `"label_positive"` and `"Positive"` all map to `Positive`.
    /// Anything unrecognised is treated as neutral.
    pub fn from_provider_label(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("positive") {
            SentimentLabel::Positive
        } else if lower.contains("negative") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    /// Strict parse of a stored label. Use `from_provider_label` for provider output.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Classifier output for one block of text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Provider confidence for the top-ranked label.
    pub score: f64,
}

impl Classification {
    /// Split into `(positive, neutral, negative)` score fields. Only the field
    /// matching the label carries the confidence; the other two are zero.
    pub fn score_fields(&self) -> (f64, f64, f64) {
        match self.label {
            SentimentLabel::Positive => (self.score, 0.0, 0.0),
            SentimentLabel::Neutral => (0.0, self.score, 0.0),
            SentimentLabel::Negative => (0.0, 0.0, self.score),
        }
    }
}

/// A persisted sentiment score. At most one per article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentScore {
    pub id: i64,
    pub article_id: i64,
    pub label: SentimentLabel,
    pub score_positive: f64,
    pub score_neutral: f64,
    pub score_negative: f64,
    pub created_at: DateTime<Utc>,
}

impl SentimentScore {
    /// The stored score field that matches this row's own label.
    pub fn label_score(&self) -> f64 {
        match self.label {
            SentimentLabel::Positive => self.score_positive,
            SentimentLabel::Neutral => self.score_neutral,
            SentimentLabel::Negative => self.score_negative,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentCounts {
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

impl SentimentCounts {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.positive + self.neutral + self.negative
    }

    /// `(positive - negative) / total`, or 0 when there is nothing to count.
    pub fn sentiment_index(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (f64::from(self.positive) - f64::from(self.negative)) / f64::from(total)
    }
}

/// A scored article as shown in a symbol summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredArticle {
    pub id: i64,
    pub symbol: String,
    pub headline: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub label: SentimentLabel,
    pub score: f64,
}

/// Per-symbol aggregate. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolSentimentSummary {
    pub symbol: String,
    pub sentiment_index: f64,
    pub counts: SentimentCounts,
    pub last_updated: DateTime<Utc>,
    pub articles: Vec<ScoredArticle>,
}

impl SymbolSentimentSummary {
    /// Summary emitted for a symbol whose refresh failed outright.
    pub fn placeholder(symbol: &str, now: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.to_string(),
            sentiment_index: 0.0,
            counts: SentimentCounts::default(),
            last_updated: now,
            articles: Vec::new(),
        }
    }
}
