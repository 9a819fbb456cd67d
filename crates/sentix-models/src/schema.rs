/// SQLite schema for the sentiment store.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS watchlist_symbols (
///     id          INTEGER PRIMARY KEY AUTOINCREMENT,
///     symbol      TEXT NOT NULL UNIQUE,
///     asset_type  TEXT,
///     created_at  TEXT NOT NULL
/// );
///
/// CREATE TABLE IF NOT EXISTS news_articles (
///     id            INTEGER PRIMARY KEY AUTOINCREMENT,
///     symbol        TEXT NOT NULL,
///     headline      TEXT NOT NULL,
///     summary       TEXT,
///     source        TEXT,
///     url           TEXT,
///     published_at  TEXT,
///     raw_text      TEXT NOT NULL,
///     created_at    TEXT NOT NULL
/// );
/// CREATE UNIQUE INDEX IF NOT EXISTS symbol_url_idx ON news_articles(symbol, url);
///
/// CREATE TABLE IF NOT EXISTS sentiment_scores (
///     id              INTEGER PRIMARY KEY AUTOINCREMENT,
///     article_id      INTEGER NOT NULL UNIQUE
///                     REFERENCES news_articles(id) ON DELETE CASCADE,
///     label           TEXT NOT NULL,
///     score_positive  REAL NOT NULL DEFAULT 0,
///     score_neutral   REAL NOT NULL DEFAULT 0,
///     score_negative  REAL NOT NULL DEFAULT 0,
///     created_at      TEXT NOT NULL
/// );
/// ```
///
/// SQLite treats NULLs as distinct in a UNIQUE index, so articles without a
/// URL never collide with each other.
pub const SENTIMENT_DDL: &str = "\
CREATE TABLE IF NOT EXISTS watchlist_symbols (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol      TEXT NOT NULL UNIQUE,
    asset_type  TEXT,
    created_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS news_articles (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    symbol        TEXT NOT NULL,
    headline      TEXT NOT NULL,
    summary       TEXT,
    source        TEXT,
    url           TEXT,
    published_at  TEXT,
    raw_text      TEXT NOT NULL,
    created_at    TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS symbol_url_idx ON news_articles(symbol, url);
CREATE INDEX IF NOT EXISTS idx_articles_symbol ON news_articles(symbol);
CREATE TABLE IF NOT EXISTS sentiment_scores (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    article_id      INTEGER NOT NULL UNIQUE
                    REFERENCES news_articles(id) ON DELETE CASCADE,
    label           TEXT NOT NULL,
    score_positive  REAL NOT NULL DEFAULT 0,
    score_neutral   REAL NOT NULL DEFAULT 0,
    score_negative  REAL NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);
";

pub mod tables {
    pub const WATCHLIST: &str = "watchlist_symbols";
    pub const ARTICLES: &str = "news_articles";
    pub const SCORES: &str = "sentiment_scores";
}
