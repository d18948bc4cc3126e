//! HTTP client for the DocSign signer API
//!
//! Implements [`SigningApi`] over the backend's REST routes:
//!
//! | Call               | Route                                          |
//! |--------------------|------------------------------------------------|
//! | `check_token`      | `GET  /signing/check?token=..`                 |
//! | `verify_signer`    | `POST /signing/verify`                         |
//! | `fetch_document`   | `GET  /documents/{id}/signing`                 |
//! | `fetch_fields`     | `GET  /documents/{id}/signing-fields?email=..` |
//! | `upload_asset`     | `POST /signatures/upload` (multipart)          |
//! | `save_signatures`  | `POST /documents/{id}/signatures`              |

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use signer_session::{
    ApiConfig, ApiError, FieldRecord, SignatureUpload, SignerSubmission, SigningApi,
    VerifiedSigner,
};

pub struct HttpSigningApi {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpSigningApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Transport(format!("Invalid base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Transport(format!(
                "Base URL cannot carry paths: {}",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            return ApiError::Timeout(self.request_timeout);
        }
        ApiError::Transport(e.to_string())
    }

    fn decode(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            return ApiError::Timeout(self.request_timeout);
        }
        ApiError::Decode(e.to_string())
    }
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
    email: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UploadBody {
    Name(String),
    #[serde(rename_all = "camelCase")]
    Object { file_name: String },
}

/// Pass 2xx responses through, turn the rest into `ApiError::Status`
async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Asset names arrive as plain text, a JSON string, or `{"fileName": ..}`
fn parse_asset_name(body: &str) -> Result<String, ApiError> {
    let name = match serde_json::from_str::<UploadBody>(body) {
        Ok(UploadBody::Name(name)) | Ok(UploadBody::Object { file_name: name }) => name,
        Err(_) => body.trim().to_string(),
    };
    if name.is_empty() {
        return Err(ApiError::Decode("upload response carried no asset name".into()));
    }
    Ok(name)
}

#[async_trait]
impl SigningApi for HttpSigningApi {
    async fn check_token(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["signing", "check"]);
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn verify_signer(&self, token: &str, email: &str) -> Result<VerifiedSigner, ApiError> {
        let url = self.endpoint(&["signing", "verify"]);
        debug!("POST {}", url);
        let response = self
            .http
            .post(url)
            .json(&VerifyRequest { token, email })
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(response).await?.json().await.map_err(|e| self.decode(e))
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(&["documents", document_id, "signing"]);
        debug!("GET {}", url);
        let response = self.http.get(url).send().await.map_err(|e| self.transport(e))?;
        let bytes = ensure_success(response).await?.bytes().await.map_err(|e| self.decode(e))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_fields(
        &self,
        document_id: &str,
        email: &str,
    ) -> Result<Vec<FieldRecord>, ApiError> {
        let url = self.endpoint(&["documents", document_id, "signing-fields"]);
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(response).await?.json().await.map_err(|e| self.decode(e))
    }

    async fn upload_asset(&self, image: SignatureUpload, email: &str) -> Result<String, ApiError> {
        let url = self.endpoint(&["signatures", "upload"]);
        debug!(
            "POST {} ({}, {} bytes)",
            url,
            image.mime_type,
            image.bytes.len()
        );
        let file_name = image.file_name();
        let file = Part::bytes(image.bytes)
            .file_name(file_name)
            .mime_str(&image.mime_type)
            .map_err(|e| ApiError::Decode(format!("invalid image MIME type: {}", e)))?;
        let form = Form::new().part("file", file).text("email", email.to_string());

        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let body = ensure_success(response).await?.text().await.map_err(|e| self.decode(e))?;
        parse_asset_name(&body)
    }

    async fn save_signatures(
        &self,
        document_id: &str,
        submission: &SignerSubmission,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["documents", document_id, "signatures"]);
        debug!(
            "POST {} ({} records)",
            url,
            submission.signature_fields.len()
        );
        let response = self
            .http
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        ensure_success(response).await?;
        Ok(())
    }
}
