//! Token and signer identity verification
//!
//! Verification is a chain of remote steps: token check, email match,
//! document download, then field retrieval. Nothing here
//! touches the field store; the caller commits a [`VerifiedSession`] only
//! when the whole chain succeeded.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::{bounded, SigningApi};
use crate::error::{ApiError, Result, SigningError};
use crate::model::{DocumentHandle, SignatureField, VerifiedSigner};

/// Everything learned by a successful email verification
#[derive(Debug, Clone)]
pub struct VerifiedSession {
    pub email: String,
    pub signer: VerifiedSigner,
    pub document: DocumentHandle,
    pub fields: Vec<SignatureField>,
}

pub struct TokenVerifier<'a, A: ?Sized> {
    api: &'a A,
    step_timeout: Duration,
}

impl<'a, A: SigningApi + ?Sized> TokenVerifier<'a, A> {
    pub fn new(api: &'a A, step_timeout: Duration) -> Self {
        Self { api, step_timeout }
    }

    /// Check the signing token with the server
    pub async fn validate_token(&self, token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(SigningError::MissingToken);
        }

        bounded(self.step_timeout, self.api.check_token(token))
            .await
            .map_err(|source| {
                warn!("Signing token rejected: {}", source);
                SigningError::InvalidToken { source }
            })?;

        info!("Signing token accepted");
        Ok(())
    }

    /// Match `email` against the token, then load the document and its fields
    pub async fn verify_email(&self, token: &str, email: &str) -> Result<VerifiedSession> {
        let email = email.trim();
        if email.is_empty() {
            return Err(SigningError::EmptyEmail);
        }

        let signer = bounded(self.step_timeout, self.api.verify_signer(token, email))
            .await
            .map_err(|source| {
                warn!("Signer verification failed: {}", source);
                SigningError::from_verification(source)
            })?;
        info!(
            "Signer verified for document {} ({})",
            signer.document_id, signer.document_name
        );

        let (document, fields) = self.retrieve(&signer, email).await?;

        Ok(VerifiedSession {
            email: email.to_string(),
            signer,
            document,
            fields,
        })
    }

    async fn retrieve(
        &self,
        signer: &VerifiedSigner,
        email: &str,
    ) -> Result<(DocumentHandle, Vec<SignatureField>)> {
        let bytes = bounded(self.step_timeout, self.api.fetch_document(&signer.document_id))
            .await
            .map_err(|source| {
                warn!("Document fetch failed for {}: {}", signer.document_id, source);
                SigningError::DocumentFetchFailure { source }
            })?;
        if bytes.is_empty() {
            return Err(SigningError::DocumentFetchFailure {
                source: ApiError::Decode("document body is empty".into()),
            });
        }
        debug!("Fetched document {} ({} bytes)", signer.document_id, bytes.len());
        let document = DocumentHandle::new(bytes);

        let records = bounded(
            self.step_timeout,
            self.api.fetch_fields(&signer.document_id, email),
        )
        .await
        .map_err(|source| {
            warn!("Field fetch failed for {}: {}", signer.document_id, source);
            SigningError::FieldsFetchFailure { source }
        })?;

        let fields = records
            .into_iter()
            .map(SignatureField::from_record)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|reason| SigningError::FieldsFetchFailure {
                source: ApiError::Decode(reason),
            })?;

        if fields.is_empty() {
            warn!("No signature fields assigned on document {}", signer.document_id);
        }

        info!(
            "Loaded {} signature fields for document {}",
            fields.len(),
            signer.document_id
        );
        Ok((document, fields))
    }
}
