use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use sentix_models::{Article, Classification, NewArticle, SentimentLabel, SentimentScore};

use crate::error::StoreError;
use crate::sqlite::{conversion_error, SentimentStore};

/// An article joined with its sentiment score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub article_id: i64,
    pub symbol: String,
    pub headline: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub score: SentimentScore,
}

const ARTICLE_COLUMNS: &str =
    "id, symbol, headline, summary, source, url, published_at, raw_text, created_at";

fn map_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        symbol: row.get(1)?,
        headline: row.get(2)?,
        description: row.get(3)?,
        source: row.get(4)?,
        url: row.get(5)?,
        published_at: row.get(6)?,
        raw_text: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn parse_label(column: usize, raw: String) -> rusqlite::Result<SentimentLabel> {
    raw.parse::<SentimentLabel>()
        .map_err(|e| conversion_error(column, e))
}

impl SentimentStore {
    /// Insert an article unless one with the same `(symbol, url)` already exists.
    ///
    /// Returns `None` when the article was already present. The check and the
    /// insert are a single `ON CONFLICT DO NOTHING` statement, so two writers
    /// racing on the same key cannot both succeed.
    pub fn insert_if_absent(&self, article: &NewArticle) -> Result<Option<Article>, StoreError> {
        let now = Utc::now();
        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO news_articles \
             (symbol, headline, summary, source, url, published_at, raw_text, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
             ON CONFLICT(symbol, url) DO NOTHING",
            params![
                article.symbol,
                article.headline,
                article.description,
                article.source,
                article.url,
                article.published_at,
                article.raw_text,
                now,
            ],
        )?;

        if inserted == 0 {
            return Ok(None);
        }

        Ok(Some(Article {
            id: conn.last_insert_rowid(),
            symbol: article.symbol.clone(),
            headline: article.headline.clone(),
            description: article.description.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            published_at: article.published_at,
            raw_text: article.raw_text.clone(),
            created_at: now,
        }))
    }

    /// Persist the score for a freshly classified article.
    ///
    /// Fails with a constraint error if the article already has a score.
    pub fn insert_score(
        &self,
        article_id: i64,
        classification: &Classification,
    ) -> Result<SentimentScore, StoreError> {
        let now = Utc::now();
        let (positive, neutral, negative) = classification.score_fields();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sentiment_scores \
             (article_id, label, score_positive, score_neutral, score_negative, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                article_id,
                classification.label.as_str(),
                positive,
                neutral,
                negative,
                now,
            ],
        )?;

        Ok(SentimentScore {
            id: conn.last_insert_rowid(),
            article_id,
            label: classification.label,
            score_positive: positive,
            score_neutral: neutral,
            score_negative: negative,
            created_at: now,
        })
    }

    pub fn get_article(&self, id: i64) -> Result<Option<Article>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM news_articles WHERE id = ?1"
        ))?;
        Ok(stmt.query_row(params![id], map_article).optional()?)
    }

    /// All stored articles for a symbol, scored or not, newest first.
    pub fn articles_for_symbol(&self, symbol: &str) -> Result<Vec<Article>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM news_articles WHERE symbol = ?1 \
             ORDER BY published_at IS NULL, published_at DESC, id DESC"
        ))?;
        let rows = stmt
            .query_map(params![symbol], map_article)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn score_for_article(&self, article_id: i64) -> Result<Option<SentimentScore>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, article_id, label, score_positive, score_neutral, score_negative, created_at \
             FROM sentiment_scores WHERE article_id = ?1",
        )?;
        let score = stmt
            .query_row(params![article_id], |row| {
                Ok(SentimentScore {
                    id: row.get(0)?,
                    article_id: row.get(1)?,
                    label: parse_label(2, row.get(2)?)?,
                    score_positive: row.get(3)?,
                    score_neutral: row.get(4)?,
                    score_negative: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .optional()?;
        Ok(score)
    }

    /// Articles for a symbol joined with their scores.
    ///
    /// Unscored articles are excluded. Ordered by `published_at` descending
    /// with undated articles last.
    pub fn scored_articles(&self, symbol: &str) -> Result<Vec<ScoredRow>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT a.id, a.symbol, a.headline, a.source, a.url, a.published_at, \
                    s.id, s.label, s.score_positive, s.score_neutral, s.score_negative, s.created_at \
             FROM news_articles a \
             INNER JOIN sentiment_scores s ON s.article_id = a.id \
             WHERE a.symbol = ?1 \
             ORDER BY a.published_at IS NULL, a.published_at DESC, a.id DESC",
        )?;

        let rows = stmt
            .query_map(params![symbol], |row| {
                let article_id: i64 = row.get(0)?;
                Ok(ScoredRow {
                    article_id,
                    symbol: row.get(1)?,
                    headline: row.get(2)?,
                    source: row.get(3)?,
                    url: row.get(4)?,
                    published_at: row.get(5)?,
                    score: SentimentScore {
                        id: row.get(6)?,
                        article_id,
                        label: parse_label(7, row.get(7)?)?,
                        score_positive: row.get(8)?,
                        score_neutral: row.get(9)?,
                        score_negative: row.get(10)?,
                        created_at: row.get(11)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Administrative delete. Cascades to the article's score.
    pub fn delete_article(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM news_articles WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn new_article(symbol: &str, url: Option<&str>, published_hours_ago: Option<i64>) -> NewArticle {
        let base = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        NewArticle {
            symbol: symbol.to_string(),
            headline: format!("{symbol} headline"),
            description: Some("description".to_string()),
            source: Some("Reuters".to_string()),
            url: url.map(str::to_string),
            published_at: published_hours_ago.map(|h| base - Duration::hours(h)),
            raw_text: format!("{symbol} headline. description"),
        }
    }

    fn positive(score: f64) -> Classification {
        Classification {
            label: SentimentLabel::Positive,
            score,
        }
    }

    #[test]
    fn insert_if_absent_inserts_then_skips_duplicate() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = new_article("AAPL", Some("https://example.com/1"), Some(1));

        let first = store.insert_if_absent(&article).unwrap();
        assert!(first.is_some());
        assert_eq!(first.unwrap().raw_text, "AAPL headline. description");

        let second = store.insert_if_absent(&article).unwrap();
        assert!(second.is_none());
        assert_eq!(store.articles_for_symbol("AAPL").unwrap().len(), 1);
    }

    #[test]
    fn same_url_for_different_symbols_is_not_a_duplicate() {
        let store = SentimentStore::open_in_memory().unwrap();
        let url = Some("https://example.com/shared");
        assert!(store
            .insert_if_absent(&new_article("AAPL", url, Some(1)))
            .unwrap()
            .is_some());
        assert!(store
            .insert_if_absent(&new_article("MSFT", url, Some(1)))
            .unwrap()
            .is_some());
    }

    #[test]
    fn null_url_never_blocks_insert() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = new_article("AAPL", None, None);
        assert!(store.insert_if_absent(&article).unwrap().is_some());
        assert!(store.insert_if_absent(&article).unwrap().is_some());
        assert_eq!(store.articles_for_symbol("AAPL").unwrap().len(), 2);
    }

    #[test]
    fn insert_score_sets_only_matching_field() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = store
            .insert_if_absent(&new_article("AAPL", Some("https://example.com/1"), Some(1)))
            .unwrap()
            .unwrap();

        let score = store
            .insert_score(
                article.id,
                &Classification {
                    label: SentimentLabel::Negative,
                    score: 0.83,
                },
            )
            .unwrap();
        assert_eq!(score.score_positive, 0.0);
        assert_eq!(score.score_neutral, 0.0);
        assert_eq!(score.score_negative, 0.83);

        let stored = store.score_for_article(article.id).unwrap().unwrap();
        assert_eq!(stored.label, SentimentLabel::Negative);
        assert_eq!(stored.label_score(), 0.83);
    }

    #[test]
    fn second_score_for_article_is_rejected() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = store
            .insert_if_absent(&new_article("AAPL", Some("https://example.com/1"), Some(1)))
            .unwrap()
            .unwrap();
        store.insert_score(article.id, &positive(0.9)).unwrap();
        assert!(store.insert_score(article.id, &positive(0.8)).is_err());
    }

    #[test]
    fn scored_articles_excludes_unscored_and_orders_newest_first() {
        let store = SentimentStore::open_in_memory().unwrap();
        let old = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/old"), Some(48)))
            .unwrap()
            .unwrap();
        let undated = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/undated"), None))
            .unwrap()
            .unwrap();
        let new = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/new"), Some(1)))
            .unwrap()
            .unwrap();
        let _unscored = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/unscored"), Some(0)))
            .unwrap()
            .unwrap();

        for id in [old.id, undated.id, new.id] {
            store.insert_score(id, &positive(0.7)).unwrap();
        }

        let rows = store.scored_articles("AAPL").unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.article_id).collect();
        assert_eq!(ids, vec![new.id, old.id, undated.id]);
    }

    #[test]
    fn scored_articles_filters_by_symbol() {
        let store = SentimentStore::open_in_memory().unwrap();
        let aapl = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/1"), Some(1)))
            .unwrap()
            .unwrap();
        let msft = store
            .insert_if_absent(&new_article("MSFT", Some("https://e.com/2"), Some(1)))
            .unwrap()
            .unwrap();
        store.insert_score(aapl.id, &positive(0.7)).unwrap();
        store.insert_score(msft.id, &positive(0.7)).unwrap();

        assert_eq!(store.scored_articles("AAPL").unwrap().len(), 1);
        assert!(store.scored_articles("TSLA").unwrap().is_empty());
    }

    #[test]
    fn delete_article_cascades_to_score() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = store
            .insert_if_absent(&new_article("AAPL", Some("https://e.com/1"), Some(1)))
            .unwrap()
            .unwrap();
        store.insert_score(article.id, &positive(0.9)).unwrap();

        assert!(store.delete_article(article.id).unwrap());
        assert!(store.get_article(article.id).unwrap().is_none());
        assert!(store.score_for_article(article.id).unwrap().is_none());
    }

    #[test]
    fn published_at_roundtrips() {
        let store = SentimentStore::open_in_memory().unwrap();
        let article = new_article("AAPL", Some("https://e.com/1"), Some(3));
        let inserted = store.insert_if_absent(&article).unwrap().unwrap();
        let loaded = store.get_article(inserted.id).unwrap().unwrap();
        assert_eq!(loaded.published_at, article.published_at);
        assert_eq!(loaded.description.as_deref(), Some("description"));
    }
}
