use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A normalized article as returned by any news source, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsCandidate {
    pub symbol: String,
    pub headline: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsCandidate {
    /// Text sent to the classifier: `"{headline}. {description}"`, trimmed.
    pub fn raw_text(&self) -> String {
        format!(
            "{}. {}",
            self.headline,
            self.description.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    pub fn into_new_article(self) -> NewArticle {
        let raw_text = self.raw_text();
        NewArticle {
            symbol: self.symbol,
            headline: self.headline,
            description: self.description,
            source: self.source,
            url: self.url,
            published_at: self.published_at,
            raw_text,
        }
    }
}

/// Row to insert into the article store. `(symbol, url)` is the dedup key.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub symbol: String,
    pub headline: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub raw_text: String,
}

/// A persisted article. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub symbol: String,
    pub headline: String,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}
