//! Remote signing API consumed by the session
//!
//! The session only sees this trait; `signer-client` provides the HTTP
//! implementation and tests provide in-memory ones.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiError;
use crate::image::SignatureUpload;
use crate::model::{FieldRecord, SignerSubmission, VerifiedSigner};

#[async_trait]
pub trait SigningApi: Send + Sync {
    /// Check that a signing token is redeemable
    async fn check_token(&self, token: &str) -> Result<(), ApiError>;

    /// Match the signer's email against the token
    async fn verify_signer(&self, token: &str, email: &str) -> Result<VerifiedSigner, ApiError>;

    /// Download the document's binary content
    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, ApiError>;

    /// Fields placed for this signer on the document
    async fn fetch_fields(
        &self,
        document_id: &str,
        email: &str,
    ) -> Result<Vec<FieldRecord>, ApiError>;

    /// Upload a signature image, returning the server-assigned asset name
    async fn upload_asset(&self, image: SignatureUpload, email: &str) -> Result<String, ApiError>;

    /// Persist the signer's completed fields
    async fn save_signatures(
        &self,
        document_id: &str,
        submission: &SignerSubmission,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: SigningApi + ?Sized> SigningApi for Arc<T> {
    async fn check_token(&self, token: &str) -> Result<(), ApiError> {
        (**self).check_token(token).await
    }

    async fn verify_signer(&self, token: &str, email: &str) -> Result<VerifiedSigner, ApiError> {
        (**self).verify_signer(token, email).await
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, ApiError> {
        (**self).fetch_document(document_id).await
    }

    async fn fetch_fields(
        &self,
        document_id: &str,
        email: &str,
    ) -> Result<Vec<FieldRecord>, ApiError> {
        (**self).fetch_fields(document_id, email).await
    }

    async fn upload_asset(&self, image: SignatureUpload, email: &str) -> Result<String, ApiError> {
        (**self).upload_asset(image, email).await
    }

    async fn save_signatures(
        &self,
        document_id: &str,
        submission: &SignerSubmission,
    ) -> Result<(), ApiError> {
        (**self).save_signatures(document_id, submission).await
    }
}

/// Run one remote call under the session's step timeout
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}
