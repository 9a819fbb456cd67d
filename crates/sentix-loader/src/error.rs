use sentix_pipeline::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Configuration error: {0}")]
    Config(String),
}
