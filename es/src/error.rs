//! Survey error types

use std::io;
use std::path::PathBuf;

use resultlog::{InvalidScore, LogError};
use thiserror::Error;

/// Errors that can occur while building the catalog or recording responses
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("Failed to list category '{category}': {source}")]
    Listing {
        category: String,
        #[source]
        source: io::Error,
    },

    #[error("Result store error: {0}")]
    Store(#[from] LogError),

    #[error("Failed to save response: {0}")]
    Append(#[source] LogError),

    #[error(transparent)]
    InvalidScore(#[from] InvalidScore),

    #[error("All {total} images are already rated")]
    Complete { total: usize },

    #[error("'{submitted}' is not the current image (expected '{expected}')")]
    StaleItem { submitted: String, expected: String },

    #[error("Image {path} cannot be displayed: {reason}")]
    Unrenderable { path: PathBuf, reason: String },

    /// The response is in the log; only the progress refresh afterwards failed
    #[error("Response saved, but progress could not be refreshed: {source}")]
    Saved {
        #[source]
        source: Box<SurveyError>,
    },
}

impl SurveyError {
    /// Whether nothing was written and resubmitting the same scores may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            SurveyError::Append(_) => true,
            SurveyError::Saved { .. } => false,
            SurveyError::Listing { .. } => false,
            SurveyError::Store(_) => false,
            SurveyError::InvalidScore(_) => false,
            SurveyError::Complete { .. } => false,
            SurveyError::StaleItem { .. } => false,
            SurveyError::Unrenderable { .. } => false,
        }
    }
}
