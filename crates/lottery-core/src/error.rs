//! error types for the lottery core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid hex input: {0}")]
    InvalidFormat(String),

    #[error("power {0} out of range (0..=22)")]
    InvalidPower(u8),

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("no accepted commitment in {attempts} attempts")]
    CommitmentExhausted { attempts: u32 },

    #[error("hash failed: {0}")]
    Hash(String),
}
