use postcraft_llm::LlmError;
use postcraft_scraper::ScraperError;
use thiserror::Error;

use crate::batch::BatchError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scrape(#[from] ScraperError),

    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("invalid input: {0}")]
    Validation(String),
}
