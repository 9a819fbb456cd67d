use crate::error::StoreError;
use crate::sqlite::SentimentStore;

/// Per-symbol article bookkeeping, used by the `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolArticleStats {
    pub symbol: String,
    pub articles: u64,
    pub scored: u64,
    /// Articles whose classification failed. These are never retried.
    pub unscored: u64,
}

impl SentimentStore {
    /// Article, scored and unscored counts per symbol.
    pub fn article_stats(&self) -> Result<Vec<SymbolArticleStats>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare_cached(
            "SELECT a.symbol, COUNT(a.id), COUNT(s.id) \
             FROM news_articles a \
             LEFT JOIN sentiment_scores s ON s.article_id = a.id \
             GROUP BY a.symbol ORDER BY a.symbol",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let articles: u64 = row.get(1)?;
                let scored: u64 = row.get(2)?;
                Ok(SymbolArticleStats {
                    symbol: row.get(0)?,
                    articles,
                    scored,
                    unscored: articles - scored,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn score_count(&self) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM sentiment_scores", [], |row| row.get(0))?;
        Ok(count)
    }
}
