//! Result log error types

use std::io;
use thiserror::Error;

/// Reasons a respondent's done-set could not be read
///
/// Callers that follow the soft-load policy downgrade every variant to an
/// empty done-set; see [`crate::LogStore::load_done_set`].
#[derive(Debug, Error)]
pub enum LogReadError {
    #[error("I/O error reading result log: {0}")]
    Io(#[from] io::Error),

    #[error("result log is empty")]
    Empty,

    #[error("result log has no '{0}' column")]
    MissingColumn(&'static str),

    #[error("malformed result log: {0}")]
    Malformed(#[from] csv::Error),

    #[error("result log contains invalid UTF-8 in row {row}")]
    InvalidUtf8 { row: u64 },
}

/// Errors from appending to, listing or exporting result logs
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid respondent identifier: {0:?}")]
    InvalidRespondent(String),

    #[error("invalid result log name: {0:?}")]
    InvalidLogName(String),

    #[error("result log not found: {0}")]
    NotFound(String),
}

/// A Likert score outside 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("score {0} is out of range (expected 1..=5)")]
pub struct InvalidScore(pub u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            LogReadError::MissingColumn("image_file").to_string(),
            "result log has no 'image_file' column"
        );
        assert_eq!(InvalidScore(7).to_string(), "score 7 is out of range (expected 1..=5)");
        assert!(LogError::NotFound("eval_x.csv".to_string()).to_string().contains("eval_x.csv"));
    }
}
