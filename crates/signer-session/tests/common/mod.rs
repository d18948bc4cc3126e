//! In-memory signing API that records every call

#![allow(dead_code)]

use async_trait::async_trait;
use signer_session::{
    ApiError, FieldKind, FieldRecord, Position, SignatureUpload, SigningApi, SignerSubmission,
    VerifiedSigner,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub const TOKEN: &str = "tok-123";
pub const EMAIL: &str = "ada@example.com";
pub const PDF_BYTES: &[u8] = b"%PDF-1.7\n%test\n";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CheckToken(String),
    VerifySigner { token: String, email: String },
    FetchDocument(String),
    FetchFields { document_id: String, email: String },
    UploadAsset { upload: SignatureUpload, email: String },
    SaveSignatures { document_id: String, submission: SignerSubmission },
}

impl Call {
    pub fn name(&self) -> &'static str {
        match self {
            Call::CheckToken(_) => "check_token",
            Call::VerifySigner { .. } => "verify_signer",
            Call::FetchDocument(_) => "fetch_document",
            Call::FetchFields { .. } => "fetch_fields",
            Call::UploadAsset { .. } => "upload_asset",
            Call::SaveSignatures { .. } => "save_signatures",
        }
    }
}

/// Which remote step should fail, and how
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub check_token: Option<ApiError>,
    pub verify_signer: Option<ApiError>,
    pub fetch_document: Option<ApiError>,
    pub fetch_fields: Option<ApiError>,
    pub upload_asset: Option<ApiError>,
    pub save_signatures: Option<ApiError>,
}

pub struct RecordingApi {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<Failures>,
    fields: Vec<FieldRecord>,
    asset_name: String,
    /// When set, `save_signatures` waits for a notification before answering
    save_gate: Option<Arc<Notify>>,
    /// Same for `fetch_fields`
    fields_gate: Option<Arc<Notify>>,
    /// Artificial latency for `save_signatures`
    save_delay: Option<Duration>,
}

impl RecordingApi {
    pub fn new(fields: Vec<FieldRecord>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(Failures::default()),
            fields,
            asset_name: "signature-0001.png".to_string(),
            save_gate: None,
            fields_gate: None,
            save_delay: None,
        }
    }

    pub fn with_failures(self, failures: Failures) -> Self {
        *self.failures.lock().unwrap() = failures;
        self
    }

    pub fn with_save_gate(mut self, gate: Arc<Notify>) -> Self {
        self.save_gate = Some(gate);
        self
    }

    pub fn with_fields_gate(mut self, gate: Arc<Notify>) -> Self {
        self.fields_gate = Some(gate);
        self
    }

    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    pub fn set_failures(&self, failures: Failures) {
        *self.failures.lock().unwrap() = failures;
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_names(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::name).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn saves(&self) -> Vec<SignerSubmission> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SaveSignatures { submission, .. } => Some(submission),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(&self, pick: impl FnOnce(&Failures) -> Option<ApiError>) -> Result<(), ApiError> {
        match pick(&self.failures.lock().unwrap()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SigningApi for RecordingApi {
    async fn check_token(&self, token: &str) -> Result<(), ApiError> {
        self.record(Call::CheckToken(token.to_string()));
        self.failure(|f| f.check_token.clone())
    }

    async fn verify_signer(&self, token: &str, email: &str) -> Result<VerifiedSigner, ApiError> {
        self.record(Call::VerifySigner {
            token: token.to_string(),
            email: email.to_string(),
        });
        self.failure(|f| f.verify_signer.clone())?;
        Ok(VerifiedSigner {
            document_id: "D1".to_string(),
            document_name: "lease.pdf".to_string(),
            signer_name: "Ada Lovelace".to_string(),
        })
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, ApiError> {
        self.record(Call::FetchDocument(document_id.to_string()));
        self.failure(|f| f.fetch_document.clone())?;
        Ok(PDF_BYTES.to_vec())
    }

    async fn fetch_fields(
        &self,
        document_id: &str,
        email: &str,
    ) -> Result<Vec<FieldRecord>, ApiError> {
        self.record(Call::FetchFields {
            document_id: document_id.to_string(),
            email: email.to_string(),
        });
        if let Some(gate) = &self.fields_gate {
            gate.notified().await;
        }
        self.failure(|f| f.fetch_fields.clone())?;
        Ok(self.fields.clone())
    }

    async fn upload_asset(&self, image: SignatureUpload, email: &str) -> Result<String, ApiError> {
        self.record(Call::UploadAsset {
            upload: image,
            email: email.to_string(),
        });
        self.failure(|f| f.upload_asset.clone())?;
        Ok(self.asset_name.clone())
    }

    async fn save_signatures(
        &self,
        document_id: &str,
        submission: &SignerSubmission,
    ) -> Result<(), ApiError> {
        self.record(Call::SaveSignatures {
            document_id: document_id.to_string(),
            submission: submission.clone(),
        });
        if let Some(gate) = &self.save_gate {
            gate.notified().await;
        }
        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.failure(|f| f.save_signatures.clone())
    }
}

pub fn record(kind: FieldKind, page: u32, x: f64, y: f64) -> FieldRecord {
    FieldRecord {
        kind,
        width: 120.0,
        height: 40.0,
        position: Position {
            page_number: page,
            x,
            y,
        },
        image: None,
        text_data: None,
    }
}

pub fn server_error(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: Some(message.to_string()),
    }
}

/// Route session logs to the test harness output; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
