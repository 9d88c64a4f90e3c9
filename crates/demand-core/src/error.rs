//! Error types for demand-core

use thiserror::Error;

/// Result type alias using demand-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Local validation failures. No remote call is made when one of these is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or whitespace-only
    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    /// Adding the batch would push the attachment list past its bound
    #[error("At most {max} attachments are allowed")]
    TooManyAttachments { max: usize },

    /// A single file is larger than the per-file bound
    #[error("Attachment {file_name} exceeds the {max_bytes} byte limit")]
    AttachmentTooLarge { file_name: String, max_bytes: u64 },

    /// A deadline could not be parsed or has no local midnight
    #[error("Invalid deadline: {0}")]
    InvalidDate(String),
}

/// Errors that can occur in demand-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Local validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Credentials are missing from the configuration store
    #[error("Trello credentials are not configured")]
    NotConfigured,

    /// A submission is already running in this session
    #[error("A submission is already in progress")]
    SubmissionInProgress,

    /// Creating the remote card failed; fatal to the submission
    #[error("Failed to create card: {0}")]
    RecordCreation(String),

    /// Uploading one attachment failed; reported per file
    #[error("Failed to attach {file_name}: {message}")]
    AttachmentUpload { file_name: String, message: String },

    /// Settings storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
