pub mod articles;
pub mod error;
pub mod sqlite;
pub mod status;
pub mod watchlist;

pub use articles::ScoredRow;
pub use error::StoreError;
pub use sqlite::SentimentStore;
pub use status::SymbolArticleStats;
