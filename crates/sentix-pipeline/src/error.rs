use sentix_providers::ProviderError;
use sentix_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("News fetch failed: {0}")]
    Fetch(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
}
