pub mod aggregator;
pub mod error;
pub mod refresh;
pub mod test_support;

pub use aggregator::{build_summary, Aggregator};
pub use error::PipelineError;
pub use refresh::{RefreshOptions, RefreshPipeline};
