use crate::domain::model::ImportErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Import(#[from] ImportErrorKind),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Cannot move import wizard from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Import cannot be committed: {reason}")]
    CommitBlocked { reason: String },

    #[error("Bulk insert failed with status {status}: {message}")]
    BulkInsertFailed { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Configuration,
    Workflow,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PipelineError::Import(_)
            | PipelineError::CsvError(_)
            | PipelineError::SerializationError(_)
            | PipelineError::FileTooLarge { .. } => ErrorCategory::Input,
            PipelineError::ApiError(_) | PipelineError::BulkInsertFailed { .. } => {
                ErrorCategory::Network
            }
            PipelineError::ConfigValidationError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PipelineError::InvalidTransition { .. } | PipelineError::CommitBlocked { .. } => {
                ErrorCategory::Workflow
            }
            PipelineError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PipelineError::CommitBlocked { .. } => ErrorSeverity::Low,
            PipelineError::ApiError(_) | PipelineError::BulkInsertFailed { .. } => {
                ErrorSeverity::Medium
            }
            PipelineError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PipelineError::Import(kind) if kind.is_fatal() => {
                "Upload a UTF-8 encoded .csv or .json file with the expected subscription fields"
            }
            PipelineError::Import(_) => "Fix the reported rows and import the file again",
            PipelineError::FileTooLarge { .. } => "Split the file into parts smaller than 2 MB",
            PipelineError::ApiError(_) | PipelineError::BulkInsertFailed { .. } => {
                "Check that the subscription API is reachable and the API key is valid, then retry"
            }
            PipelineError::ConfigValidationError { .. }
            | PipelineError::InvalidConfigValueError { .. }
            | PipelineError::MissingConfigError { .. } => {
                "Review the configuration file and command line arguments"
            }
            PipelineError::InvalidTransition { .. } => "Reset the import and start from the upload step",
            PipelineError::CommitBlocked { .. } => {
                "Resolve every validation error before committing the import"
            }
            PipelineError::CsvError(_) | PipelineError::SerializationError(_) => {
                "Check the file contents for encoding or quoting problems"
            }
            PipelineError::IoError(_) => "Check the file path and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PipelineError::Import(kind) => kind.to_string(),
            PipelineError::FileTooLarge { limit, .. } => {
                format!("The file exceeds the {} KB upload limit", limit / 1024)
            }
            PipelineError::ApiError(_) => "Could not reach the subscription service".to_string(),
            PipelineError::BulkInsertFailed { status, .. } => {
                format!("The subscription service rejected the import (HTTP {})", status)
            }
            PipelineError::CommitBlocked { reason } => format!("Import not committed: {}", reason),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_import_error_is_input_category() {
        let error = PipelineError::from(ImportErrorKind::MalformedJson {
            message: "expected value".to_string(),
        });
        assert_eq!(error.category(), ErrorCategory::Input);
        assert_eq!(error.severity(), ErrorSeverity::High);
        assert!(error.user_friendly_message().contains("Malformed JSON"));
    }

    #[test]
    fn test_commit_blocked_is_low_severity() {
        let error = PipelineError::CommitBlocked {
            reason: "2 rows have errors".to_string(),
        };
        assert_eq!(error.severity(), ErrorSeverity::Low);
        assert_eq!(error.category(), ErrorCategory::Workflow);
    }
}
