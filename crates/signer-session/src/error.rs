//! Error types for the signer session

use std::time::Duration;
use thiserror::Error;

use crate::model::FieldKind;

/// Failure reported by the remote signing API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status {
        status: u16,
        /// Human-readable message from the response body, if any
        message: Option<String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl ApiError {
    /// Server-provided message, if the failure carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status code, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub const INVALID_ACCESS_MESSAGE: &str = "Invalid access.";
pub const TOKEN_CHECK_MESSAGE: &str = "Failed to verify the signing request.";
pub const EMAIL_VERIFICATION_MESSAGE: &str = "Email verification failed. Please try again.";
pub const NOTHING_TO_SUBMIT_MESSAGE: &str = "There are no fields to sign.";
pub const SUBMISSION_FAILED_MESSAGE: &str = "An error occurred while saving the signature.";

#[derive(Debug, Clone, Error)]
pub enum SigningError {
    #[error("No signing token was supplied")]
    MissingToken,

    #[error("Signing token rejected: {source}")]
    InvalidToken { source: ApiError },

    #[error("Email must not be empty")]
    EmptyEmail,

    #[error("Signing token has not been validated")]
    TokenNotValidated,

    #[error("Signer email has already been verified")]
    AlreadyVerified,

    #[error("Email does not match the signing request: {source}")]
    EmailMismatch { source: ApiError },

    #[error("Signing token has expired: {source}")]
    ExpiredToken { source: ApiError },

    #[error("Server error during verification: {source}")]
    Server { source: ApiError },

    #[error("Failed to fetch document: {source}")]
    DocumentFetchFailure { source: ApiError },

    #[error("Failed to fetch signature fields: {source}")]
    FieldsFetchFailure { source: ApiError },

    #[error("Failed to upload signature image: {source}")]
    AssetUploadFailure { source: ApiError },

    #[error("Failed to save signatures: {source}")]
    SaveFailure { source: ApiError },

    #[error("Nothing to submit")]
    NothingToSubmit,

    #[error("Field index {index} out of range ({len} fields)")]
    InvalidFieldIndex { index: usize, len: usize },

    #[error("Field {index} expects {expected:?} content")]
    ContentKindMismatch { index: usize, expected: FieldKind },

    #[error("Invalid signature image: {0}")]
    InvalidImage(String),

    #[error("Page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("Document content attached before the document was identified")]
    DocumentBeforeIdentity,

    #[error("Another signing operation is already in progress")]
    OperationInProgress,

    #[error("Session was reset while the operation was in flight")]
    SessionReset,
}

impl SigningError {
    /// Classify a failed `verifySigner` call
    pub fn from_verification(source: ApiError) -> Self {
        match source.status() {
            Some(401) | Some(403) | Some(404) => SigningError::EmailMismatch { source },
            Some(410) => SigningError::ExpiredToken { source },
            _ => SigningError::Server { source },
        }
    }

    /// Text shown to the signer for this failure
    pub fn user_message(&self) -> String {
        match self {
            SigningError::MissingToken => INVALID_ACCESS_MESSAGE.to_string(),
            SigningError::InvalidToken { source } => source
                .server_message()
                .unwrap_or(TOKEN_CHECK_MESSAGE)
                .to_string(),
            SigningError::EmailMismatch { source }
            | SigningError::ExpiredToken { source }
            | SigningError::Server { source }
            | SigningError::DocumentFetchFailure { source }
            | SigningError::FieldsFetchFailure { source } => source
                .server_message()
                .unwrap_or(EMAIL_VERIFICATION_MESSAGE)
                .to_string(),
            SigningError::EmptyEmail | SigningError::TokenNotValidated => {
                EMAIL_VERIFICATION_MESSAGE.to_string()
            }
            SigningError::NothingToSubmit => NOTHING_TO_SUBMIT_MESSAGE.to_string(),
            SigningError::AssetUploadFailure { .. }
            | SigningError::SaveFailure { .. }
            | SigningError::InvalidImage(_) => SUBMISSION_FAILED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SigningError>;
