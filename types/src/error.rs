//! Errors raised while parsing or validating the shared types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid vote choice: {0:?} (expected approve, disapprove or abstain)")]
    InvalidChoice(String),

    #[error("invalid NSB response type: {0:?}")]
    InvalidResponseType(String),

    #[error("invalid balloting status: {0:?}")]
    InvalidStatus(String),

    #[error("invalid {name}: {bps} basis points (expected 1..=10000)")]
    InvalidThreshold { name: &'static str, bps: u32 },
}
