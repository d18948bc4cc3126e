//! Drawn signature images
//!
//! Signature pads hand us the drawing as a data URL
//! (`data:image/png;base64,...`). The string form is what the overlay
//! displays; the decoded bytes, tagged with the declared MIME type, are
//! what gets uploaded.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SigningError};

const DEFAULT_MIME: &str = "image/png";

/// An encoded signature image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureImage(String);

impl SignatureImage {
    /// Wrap a data URL (or bare base64 payload) as produced by a signature pad
    pub fn from_data_url(data_url: impl Into<String>) -> Self {
        Self(data_url.into())
    }

    /// Encode raw PNG bytes as a data URL
    pub fn from_png_bytes(bytes: &[u8]) -> Self {
        Self(format!("data:{};base64,{}", DEFAULT_MIME, BASE64.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// MIME type declared by the data URL, `image/png` when absent
    pub fn mime_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME)
    }

    /// Decode into the binary payload sent to the asset upload endpoint
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = match self.0.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    SigningError::InvalidImage("data URL has no payload separator".into())
                })?;
                if !header.ends_with(";base64") {
                    return Err(SigningError::InvalidImage(
                        "only base64 data URLs are supported".into(),
                    ));
                }
                payload
            }
            None => self.0.as_str(),
        };

        let payload = payload.trim();
        if payload.is_empty() {
            return Err(SigningError::InvalidImage("image payload is empty".into()));
        }

        BASE64
            .decode(payload)
            .map_err(|e| SigningError::InvalidImage(e.to_string()))
    }

    /// Decode into an upload that keeps the declared MIME type
    pub fn to_upload(&self) -> Result<SignatureUpload> {
        Ok(SignatureUpload {
            bytes: self.decode()?,
            mime_type: self.mime_type().to_string(),
        })
    }
}

/// Binary signature image ready for the asset upload endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SignatureUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// File name sent with the upload, extension taken from the MIME type
    pub fn file_name(&self) -> String {
        let subtype = self
            .mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype)
            .unwrap_or_default();
        // image/svg+xml -> svg
        let extension = match subtype.split('+').next().unwrap_or_default() {
            "jpeg" => "jpg",
            "" => "bin",
            other => other,
        };
        format!("signature.{}", extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_decode_png_data_url() {
        let image = SignatureImage::from_png_bytes(&PNG_MAGIC);
        assert!(image.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.decode().unwrap(), PNG_MAGIC.to_vec());
    }

    #[test]
    fn test_decode_bare_base64() {
        let image = SignatureImage::from_data_url(BASE64.encode(b"abc"));
        assert_eq!(image.decode().unwrap(), b"abc".to_vec());
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_rejects_non_base64_data_url() {
        let image = SignatureImage::from_data_url("data:image/svg+xml,<svg/>");
        assert_eq!(image.mime_type(), "image/svg+xml");
        assert!(matches!(image.decode(), Err(SigningError::InvalidImage(_))));
    }

    #[test]
    fn test_upload_keeps_declared_mime_type() {
        let image = SignatureImage::from_data_url("data:image/jpeg;base64,/9j/4AAQ");
        let upload = image.to_upload().unwrap();
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.bytes, vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        assert_eq!(upload.file_name(), "signature.jpg");

        let upload = SignatureImage::from_png_bytes(b"x").to_upload().unwrap();
        assert_eq!(upload.file_name(), "signature.png");
        assert_eq!(
            SignatureUpload::new(Vec::new(), "image/svg+xml").file_name(),
            "signature.svg"
        );
        assert_eq!(
            SignatureUpload::new(Vec::new(), "garbage").file_name(),
            "signature.bin"
        );
    }

    #[test]
    fn test_rejects_empty_and_garbage() {
        assert!(SignatureImage::from_data_url("data:image/png;base64,").decode().is_err());
        assert!(SignatureImage::from_data_url("data:image/png;base64").decode().is_err());
        assert!(SignatureImage::from_data_url("!!not base64!!").decode().is_err());
        assert!(SignatureImage::from_data_url("  ").is_empty());
    }
}
