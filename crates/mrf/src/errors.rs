//! Classifier error types

use citectx_common::errors::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MrfError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Probability vector must have 2 components, got {len}")]
    InvalidProbabilityVector { len: usize },

    #[error("Self-belief score for sentence {sentence} of document {document} is not finite: {score}")]
    NonFiniteSelfBelief {
        document: String,
        sentence: usize,
        score: f64,
    },

    #[error("Classification task failed: {0}")]
    TaskFailed(String),
}

impl MrfError {
    /// Configuration errors (including malformed probability vectors)
    /// abort the whole run; everything else only aborts the current document
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MrfError::InvalidConfiguration(_) | MrfError::InvalidProbabilityVector { .. }
        )
    }

    /// Short machine-readable code, used as a metrics label
    pub fn code(&self) -> &'static str {
        match self {
            MrfError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            MrfError::InvalidProbabilityVector { .. } => "INVALID_PROBABILITY_VECTOR",
            MrfError::NonFiniteSelfBelief { .. } => "NON_FINITE_SELF_BELIEF",
            MrfError::TaskFailed(_) => "TASK_FAILED",
        }
    }
}

impl From<AppError> for MrfError {
    fn from(e: AppError) -> Self {
        if e.is_fatal() {
            MrfError::InvalidConfiguration(e.to_string())
        } else {
            MrfError::TaskFailed(e.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for MrfError {
    fn from(e: tokio::task::JoinError) -> Self {
        MrfError::TaskFailed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(MrfError::InvalidConfiguration("delta".to_string()).is_fatal());
        assert!(MrfError::InvalidProbabilityVector { len: 3 }.is_fatal());
        assert!(!MrfError::TaskFailed("join".to_string()).is_fatal());
        assert!(!MrfError::NonFiniteSelfBelief {
            document: "doc".to_string(),
            sentence: 0,
            score: f64::NAN,
        }
        .is_fatal());
    }

    #[test]
    fn test_app_error_mapping() {
        let fatal = AppError::Configuration { message: "bad".to_string() };
        assert!(matches!(MrfError::from(fatal), MrfError::InvalidConfiguration(_)));
    }
}
