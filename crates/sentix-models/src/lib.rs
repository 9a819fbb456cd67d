pub mod article;
pub mod config;
pub mod schema;
pub mod sentiment;
pub mod watchlist;

pub use article::{Article, NewArticle, NewsCandidate};
pub use config::{
    ClassifierConfig, NewsConfig, NewsProviderKind, PipelineConfig, SentixConfig, StoreConfig,
};
pub use sentiment::{
    Classification, ScoredArticle, SentimentCounts, SentimentLabel, SentimentScore,
    SymbolSentimentSummary,
};
pub use watchlist::{AssetType, BulkAddResult, WatchlistEntry, WatchlistSymbol};
