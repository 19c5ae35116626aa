use std::path::PathBuf;
use thiserror::Error;

/// Which field of a record failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Interests,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Name => write!(f, "name"),
            Field::Interests => write!(f, "interests"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("row {row}: missing or empty {field}")]
    MalformedRecord { row: usize, field: Field },

    #[error("record source {path} unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("top_n must be at least 1")]
    InvalidTopN,
}

impl MatchError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        MatchError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
