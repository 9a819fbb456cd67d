use std::sync::Arc;

use chrono::{DateTime, Utc};
use sentix_models::{ScoredArticle, SentimentCounts, SymbolSentimentSummary};
use sentix_store::{ScoredRow, SentimentStore, StoreError};

/// Computes per-symbol summaries from stored articles and scores.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<SentimentStore>,
}

impl Aggregator {
    pub fn new(store: Arc<SentimentStore>) -> Self {
        Self { store }
    }

    /// Summary over the symbol's scored articles. Unscored articles are ignored.
    pub fn summarize(&self, symbol: &str) -> Result<SymbolSentimentSummary, StoreError> {
        let rows = self.store.scored_articles(symbol)?;
        Ok(build_summary(symbol, rows, Utc::now()))
    }

    /// Summaries for `symbols`, or for every watchlist symbol when `None` or
    /// empty. Symbols are matched uppercase.
    pub fn summarize_many(
        &self,
        symbols: Option<&[String]>,
    ) -> Result<Vec<SymbolSentimentSummary>, StoreError> {
        let targets: Vec<String> = match symbols {
            Some(symbols) if !symbols.is_empty() => {
                symbols.iter().map(|s| s.trim().to_uppercase()).collect()
            }
            _ => self
                .store
                .list_watchlist()?
                .into_iter()
                .map(|entry| entry.symbol)
                .collect(),
        };
        targets.iter().map(|symbol| self.summarize(symbol)).collect()
    }
}

/// Fold joined rows into a summary. `rows` must already be ordered for display.
/// `now` is used as `last_updated` when there are no rows.
pub fn build_summary(
    symbol: &str,
    rows: Vec<ScoredRow>,
    now: DateTime<Utc>,
) -> SymbolSentimentSummary {
    let mut counts = SentimentCounts::default();
    let last_updated = rows
        .iter()
        .map(|row| row.score.created_at)
        .max()
        .unwrap_or(now);

    let articles = rows
        .into_iter()
        .map(|row| {
            counts.record(row.score.label);
            ScoredArticle {
                id: row.article_id,
                symbol: row.symbol,
                headline: row.headline,
                source: row.source,
                url: row.url,
                published_at: row.published_at,
                label: row.score.label,
                score: row.score.label_score(),
            }
        })
        .collect();

    SymbolSentimentSummary {
        symbol: symbol.to_string(),
        sentiment_index: counts.sentiment_index(),
        counts,
        last_updated,
        articles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sentix_models::{Classification, NewArticle, SentimentLabel, SentimentScore};

    fn row(id: i64, label: SentimentLabel, score: f64, scored_at: DateTime<Utc>) -> ScoredRow {
        let (pos, neu, neg) = Classification { label, score }.score_fields();
        ScoredRow {
            article_id: id,
            symbol: "AAPL".to_string(),
            headline: format!("headline {id}"),
            source: None,
            url: Some(format!("https://e.com/{id}")),
            published_at: None,
            score: SentimentScore {
                id,
                article_id: id,
                label,
                score_positive: pos,
                score_neutral: neu,
                score_negative: neg,
                created_at: scored_at,
            },
        }
    }

    fn labelled(pos: usize, neu: usize, neg: usize) -> Vec<ScoredRow> {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let labels = std::iter::repeat(SentimentLabel::Positive)
            .take(pos)
            .chain(std::iter::repeat(SentimentLabel::Neutral).take(neu))
            .chain(std::iter::repeat(SentimentLabel::Negative).take(neg));
        labels
            .enumerate()
            .map(|(i, label)| row(i as i64 + 1, label, 0.9, at))
            .collect()
    }

    #[test]
    fn five_positive_one_negative() {
        let summary = build_summary("AAPL", labelled(5, 0, 1), Utc::now());
        assert!((summary.sentiment_index - 4.0 / 6.0).abs() < 1e-9);
        assert_eq!(summary.counts.positive, 5);
        assert_eq!(summary.counts.negative, 1);
    }

    #[test]
    fn two_positive_eight_negative() {
        let summary = build_summary("AAPL", labelled(2, 0, 8), Utc::now());
        assert!((summary.sentiment_index + 0.6).abs() < 1e-9);
    }

    #[test]
    fn balanced_is_zero() {
        let summary = build_summary("AAPL", labelled(3, 0, 3), Utc::now());
        assert_eq!(summary.sentiment_index, 0.0);
    }

    #[test]
    fn empty_is_zero_and_uses_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let summary = build_summary("AAPL", vec![], now);
        assert_eq!(summary.sentiment_index, 0.0);
        assert!(!summary.sentiment_index.is_nan());
        assert_eq!(summary.counts.total(), 0);
        assert_eq!(summary.last_updated, now);
        assert!(summary.articles.is_empty());
    }

    #[test]
    fn counts_match_rows_and_index_in_range() {
        for (pos, neu, neg) in [(0, 4, 0), (1, 2, 3), (7, 0, 0), (0, 0, 9), (2, 5, 1)] {
            let summary = build_summary("AAPL", labelled(pos, neu, neg), Utc::now());
            assert_eq!(summary.counts.total() as usize, pos + neu + neg);
            assert_eq!(summary.articles.len(), pos + neu + neg);
            assert!((-1.0..=1.0).contains(&summary.sentiment_index));
        }
    }

    #[test]
    fn displayed_score_matches_label_field() {
        let at = Utc::now();
        let summary = build_summary(
            "AAPL",
            vec![
                row(1, SentimentLabel::Negative, 0.81, at),
                row(2, SentimentLabel::Neutral, 0.55, at),
            ],
            at,
        );
        assert_eq!(summary.articles[0].label, SentimentLabel::Negative);
        assert!((summary.articles[0].score - 0.81).abs() < 1e-9);
        assert!((summary.articles[1].score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn last_updated_is_latest_score() {
        let base = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let latest = base + Duration::hours(3);
        let summary = build_summary(
            "AAPL",
            vec![
                row(1, SentimentLabel::Positive, 0.9, base),
                row(2, SentimentLabel::Positive, 0.9, latest),
                row(3, SentimentLabel::Neutral, 0.5, base + Duration::hours(1)),
            ],
            Utc::now(),
        );
        assert_eq!(summary.last_updated, latest);
    }

    #[test]
    fn summarize_excludes_unscored_articles() {
        let store = Arc::new(SentimentStore::open_in_memory().unwrap());
        let new_article = |url: &str| NewArticle {
            symbol: "TSLA".to_string(),
            headline: "Tesla".to_string(),
            description: None,
            source: None,
            url: Some(url.to_string()),
            published_at: None,
            raw_text: "Tesla.".to_string(),
        };
        let scored = store
            .insert_if_absent(&new_article("https://e.com/1"))
            .unwrap()
            .unwrap();
        store
            .insert_if_absent(&new_article("https://e.com/2"))
            .unwrap();
        store
            .insert_score(
                scored.id,
                &Classification {
                    label: SentimentLabel::Negative,
                    score: 0.7,
                },
            )
            .unwrap();

        let summary = Aggregator::new(store).summarize("TSLA").unwrap();
        assert_eq!(summary.counts.total(), 1);
        assert_eq!(summary.articles.len(), 1);
        assert_eq!(summary.articles[0].id, scored.id);
        assert_eq!(summary.sentiment_index, -1.0);
    }
}
