//! Two-phase signature submission
//!
//! Phase 1 uploads the first drawn signature image, if any. Phase 2 saves
//! one record per field in a single request. Phase 2 is only built after
//! phase 1 resolved, and any failure aborts the whole submission.
//!
//! The plan is a snapshot taken from the store before the first network
//! call, so edits made while a submission is in flight cannot leak into it
//! and a failed submission can be replayed from the unchanged store.

use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::{bounded, SigningApi};
use crate::error::{Result, SigningError};
use crate::image::SignatureUpload;
use crate::model::{FieldKind, SignatureField, SignerSubmission, SubmissionRecord};
use crate::store::FieldStore;

#[derive(Debug, Clone)]
pub struct SubmissionPlan {
    document_id: String,
    signer_email: String,
    signer_name: String,
    fields: Vec<SignatureField>,
    upload: Option<SignatureUpload>,
}

impl SubmissionPlan {
    /// Snapshot the store into a submission, decoding the image to upload
    ///
    /// Fails with [`SigningError::NothingToSubmit`] when no document is
    /// identified or there are no fields.
    pub fn prepare(store: &FieldStore) -> Result<Self> {
        let document_id = store.document_id().ok_or(SigningError::NothingToSubmit)?;
        if store.fields().is_empty() {
            return Err(SigningError::NothingToSubmit);
        }
        let signer_email = store.signer_email().ok_or(SigningError::NothingToSubmit)?;

        let mut drawn = store
            .fields()
            .iter()
            .filter(|f| f.kind() == FieldKind::Image)
            .filter_map(SignatureField::image)
            .filter(|image| !image.is_empty());

        let upload = drawn.next().map(|image| image.to_upload()).transpose()?;
        let extra_images = drawn.count();
        if extra_images > 0 {
            warn!(
                "{} additional drawn images will reuse the first uploaded image",
                extra_images
            );
        }

        Ok(Self {
            document_id: document_id.to_string(),
            signer_email: signer_email.to_string(),
            signer_name: store.signer_name().unwrap_or_default().to_string(),
            fields: store.fields().to_vec(),
            upload,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Whether phase 1 will run
    pub fn needs_upload(&self) -> bool {
        self.upload.is_some()
    }

    /// Build the phase 2 body, stamping `asset_name` on every image field
    pub fn submission(&self, asset_name: Option<&str>) -> SignerSubmission {
        let signature_fields = self
            .fields
            .iter()
            .map(|field| {
                let size = field.size();
                SubmissionRecord {
                    signer_email: self.signer_email.clone(),
                    kind: field.kind(),
                    width: size.width,
                    height: size.height,
                    position: field.position(),
                    image_name: match field.kind() {
                        FieldKind::Image => asset_name.map(str::to_string),
                        FieldKind::Text => None,
                    },
                    text_data: field
                        .text()
                        .filter(|text| !text.is_empty())
                        .map(str::to_string),
                }
            })
            .collect();

        SignerSubmission {
            email: self.signer_email.clone(),
            name: self.signer_name.clone(),
            signature_fields,
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub document_id: String,
    pub asset_name: Option<String>,
    pub record_count: usize,
}

pub struct SubmissionPipeline<'a, A: ?Sized> {
    api: &'a A,
    step_timeout: Duration,
}

impl<'a, A: SigningApi + ?Sized> SubmissionPipeline<'a, A> {
    pub fn new(api: &'a A, step_timeout: Duration) -> Self {
        Self { api, step_timeout }
    }

    /// Run both phases for a prepared plan
    pub async fn run(&self, plan: SubmissionPlan) -> Result<SubmissionReceipt> {
        let asset_name = match &plan.upload {
            Some(image) => {
                info!(
                    "Uploading signature image ({}, {} bytes)",
                    image.mime_type,
                    image.bytes.len()
                );
                let name = bounded(
                    self.step_timeout,
                    self.api.upload_asset(image.clone(), &plan.signer_email),
                )
                .await
                .map_err(|source| {
                    error!("Signature image upload failed: {}", source);
                    SigningError::AssetUploadFailure { source }
                })?;
                info!("Signature image uploaded as {}", name);
                Some(name)
            }
            None => {
                debug!("No drawn signature to upload");
                None
            }
        };

        let submission = plan.submission(asset_name.as_deref());
        let record_count = submission.signature_fields.len();

        info!(
            "Saving {} signature records for document {}",
            record_count, plan.document_id
        );
        bounded(
            self.step_timeout,
            self.api.save_signatures(&plan.document_id, &submission),
        )
        .await
        .map_err(|source| {
            error!("Saving signatures failed: {}", source);
            SigningError::SaveFailure { source }
        })?;
        info!("Signatures saved for document {}", plan.document_id);

        Ok(SubmissionReceipt {
            document_id: plan.document_id,
            asset_name,
            record_count,
        })
    }
}
