use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the fingerprinting and matching engine.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("input unavailable: {path}: {reason}")]
    InputUnavailable { path: PathBuf, reason: String },

    #[error("failed to decode {path}: {reason}")]
    DecodeFailed { path: PathBuf, reason: String },

    #[error("{path} is empty after silence trim")]
    EmptyAfterTrim { path: PathBuf },

    #[error("invalid parameter: {0}")]
    ParameterInvalid(String),

    #[error("run was cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MatchError>;
