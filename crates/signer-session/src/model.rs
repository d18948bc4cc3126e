//! Data model for a signer's session
//!
//! Wire shapes use camelCase JSON and encode the field kind as the
//! numeric `type` the signing backend expects (0 = image, 1 = text).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::image::SignatureImage;

/// What a signature field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FieldKind {
    /// Drawn signature
    Image,
    /// Typed text
    Text,
}

impl From<FieldKind> for u8 {
    fn from(kind: FieldKind) -> u8 {
        match kind {
            FieldKind::Image => 0,
            FieldKind::Text => 1,
        }
    }
}

impl TryFrom<u8> for FieldKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FieldKind::Image),
            1 => Ok(FieldKind::Text),
            other => Err(format!("unknown field type: {}", other)),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Image => write!(f, "image"),
            FieldKind::Text => write!(f, "text"),
        }
    }
}

/// Top-left anchor of a field in document-rendering coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Captured content of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldContent {
    Image(SignatureImage),
    Text(String),
}

impl FieldContent {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldContent::Image(_) => FieldKind::Image,
            FieldContent::Text(_) => FieldKind::Text,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldContent::Image(image) => image.is_empty(),
            FieldContent::Text(text) => text.is_empty(),
        }
    }
}

/// One placement slot on the document
///
/// Placement (`kind`, `position`, `size`) is fixed at construction; only the
/// content changes, and only through the field store.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureField {
    kind: FieldKind,
    position: Position,
    size: Size,
    content: Option<FieldContent>,
}

impl SignatureField {
    pub fn new(kind: FieldKind, position: Position, size: Size) -> Self {
        Self {
            kind,
            position,
            size,
            content: None,
        }
    }

    /// Build a field from the backend's record, validating its placement
    pub fn from_record(record: FieldRecord) -> Result<Self, String> {
        if record.position.page_number == 0 {
            return Err("field page numbers start at 1".to_string());
        }
        if !(record.width > 0.0 && record.height > 0.0) {
            return Err(format!(
                "field size must be positive, got {}x{}",
                record.width, record.height
            ));
        }

        let content = match record.kind {
            FieldKind::Image => record.image.map(FieldContent::Image),
            FieldKind::Text => record.text_data.map(FieldContent::Text),
        }
        .filter(|content| !content.is_empty());

        Ok(Self {
            kind: record.kind,
            position: record.position,
            size: Size {
                width: record.width,
                height: record.height,
            },
            content,
        })
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn page_number(&self) -> u32 {
        self.position.page_number
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn content(&self) -> Option<&FieldContent> {
        self.content.as_ref()
    }

    pub fn image(&self) -> Option<&SignatureImage> {
        match &self.content {
            Some(FieldContent::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(FieldContent::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.content.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub(crate) fn replace_content(&mut self, content: Option<FieldContent>) {
        self.content = content;
    }
}

/// Field as delivered by `fetchFields`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub width: f64,
    pub height: f64,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<SignatureImage>,
    #[serde(default, alias = "text", skip_serializing_if = "Option::is_none")]
    pub text_data: Option<String>,
}

/// Identity returned once the signer's email matched the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSigner {
    pub document_id: String,
    pub document_name: String,
    pub signer_name: String,
}

/// Loaded document content, handed to the viewer as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    bytes: Arc<[u8]>,
}

impl DocumentHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One persisted signature, as sent in the save request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub signer_email: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub width: f64,
    pub height: f64,
    pub position: Position,
    pub image_name: Option<String>,
    pub text_data: Option<String>,
}

/// Body of `saveSignatures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignerSubmission {
    pub email: String,
    pub name: String,
    pub signature_fields: Vec<SubmissionRecord>,
}
