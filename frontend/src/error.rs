//! Error types for the upload workflow.
//!
//! - [`UploadError`] - every way an upload attempt can end without success
//! - [`TransportError`] - failures reported by an [`crate::UploadTransport`]
//!
//! The `Display` text of [`UploadError`] is the message shown to the user.

use thiserror::Error;

/// Placeholder shown when the storage endpoint answers with an empty body.
pub const EMPTY_TRANSFER_BODY: &str = "No response from S3";

/// Errors ending an upload attempt.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum UploadError {
    /// Upload triggered with nothing selected.
    #[error("Please select a file")]
    NoFileSelected,

    /// Another attempt is still running.
    #[error("An upload is already in progress")]
    Busy,

    /// The destination-issuing endpoint answered with a non-2xx status.
    #[error("Backend error ❌\nStatus: {status}\nResponse: {body}")]
    DestinationRequestFailed { status: u16, body: String },

    /// The destination-issuing endpoint could not be reached.
    #[error("Network error ❌ Unable to reach backend: {0}")]
    DestinationUnreachable(String),

    /// A 2xx destination response did not carry an upload URL.
    #[error("Backend error ❌\nInvalid response: {0}")]
    InvalidDestination(String),

    /// The storage endpoint answered with a status that is not success.
    #[error("Upload failed ❌\nStatus: {status}\nResponse: {}", or_placeholder(.body))]
    TransferHttpFailed { status: u16, body: String },

    /// The storage endpoint could not be reached.
    #[error("Network error ❌ Unable to reach S3")]
    TransferNetworkFailed,
}

fn or_placeholder(body: &str) -> &str {
    if body.is_empty() {
        EMPTY_TRANSFER_BODY
    } else {
        body
    }
}

/// Result type alias for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Failure below HTTP: the request could not be built, sent or answered.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
