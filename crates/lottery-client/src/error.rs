//! error types for the lottery client

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] lottery_core::Error),

    #[error("no bet found for lookup key {lookup}")]
    BetNotFound { lookup: String },

    #[error("bet at index {index} is still processing (randomness not yet revealed)")]
    BetStillProcessing { index: u64 },

    #[error("malformed merkle path: expected {expected} elements, got {got}")]
    MalformedPath { expected: usize, got: usize },

    #[error("proof generation failed: {0}")]
    ProofGenerationFailed(String),

    #[error("indexer error: {0}")]
    Indexer(String),

    #[error("unexpected indexer response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// whether the caller should wait for chain finalization and retry the
    /// resolution step; everything else is fatal for the attempt
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Error::BetNotFound { .. } | Error::BetStillProcessing { .. }
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Indexer(err.to_string())
    }
}
