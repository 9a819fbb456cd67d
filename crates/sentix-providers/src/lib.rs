pub mod classifier;
pub mod credentials;
pub mod error;
pub mod news;

pub use classifier::{build_classifier, HuggingFaceClassifier, RetryPolicy, SentimentClassifier};
pub use error::{ClassifierError, ConfigError, ProviderError};
pub use news::alpha_vantage::AlphaVantageSource;
pub use news::newsapi::NewsApiSource;
pub use news::{build_news_source, NewsSource};
