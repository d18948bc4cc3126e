//! Field store: the single owner of a signer's session state
//!
//! Every write to the field list goes through this type so the page
//! grouping index can never drift from the fields it was built from.

use crate::error::{Result, SigningError};
use crate::model::{DocumentHandle, SignatureField, VerifiedSigner};
use crate::pages::{PageGroupIndex, PageNavigator};

#[derive(Debug, Clone)]
pub struct FieldStore {
    token: String,
    signer_email: Option<String>,
    signer: Option<VerifiedSigner>,
    document: Option<DocumentHandle>,
    pub(crate) fields: Vec<SignatureField>,
    pages: PageGroupIndex,
    navigator: PageNavigator,
    version: u64,
}

impl FieldStore {
    /// Open a store for a signing token
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(SigningError::MissingToken);
        }
        Ok(Self {
            token,
            signer_email: None,
            signer: None,
            document: None,
            fields: Vec::new(),
            pages: PageGroupIndex::default(),
            navigator: PageNavigator::default(),
            version: 0,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn signer_email(&self) -> Option<&str> {
        self.signer_email.as_deref()
    }

    pub fn signer_name(&self) -> Option<&str> {
        self.signer.as_ref().map(|s| s.signer_name.as_str())
    }

    pub fn document_id(&self) -> Option<&str> {
        self.signer.as_ref().map(|s| s.document_id.as_str())
    }

    pub fn document_name(&self) -> Option<&str> {
        self.signer.as_ref().map(|s| s.document_name.as_str())
    }

    pub fn document(&self) -> Option<&DocumentHandle> {
        self.document.as_ref()
    }

    pub fn fields(&self) -> &[SignatureField] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&SignatureField> {
        self.fields.get(index)
    }

    pub fn pages(&self) -> &PageGroupIndex {
        &self.pages
    }

    pub fn current_page(&self) -> u32 {
        self.navigator.current_page()
    }

    /// Bumped on every change to the field list
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn completed_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_completed()).count()
    }

    /// Fields the overlay draws on the current page, with their store indices
    pub fn current_page_fields(&self) -> Vec<(usize, &SignatureField)> {
        self.pages
            .fields_on(self.current_page())
            .iter()
            .map(|&index| (index, &self.fields[index]))
            .collect()
    }

    pub fn set_signer_email(&mut self, email: impl Into<String>) {
        self.signer_email = Some(email.into());
    }

    pub fn apply_verification(&mut self, signer: VerifiedSigner) {
        self.signer = Some(signer);
    }

    /// Attach loaded document content; only valid once the document is identified
    pub fn attach_document(&mut self, document: DocumentHandle) -> Result<()> {
        if self.signer.is_none() {
            return Err(SigningError::DocumentBeforeIdentity);
        }
        self.document = Some(document);
        Ok(())
    }

    pub fn replace_fields(&mut self, fields: Vec<SignatureField>) {
        self.fields = fields;
        self.fields_changed();
    }

    pub fn navigate_to(&mut self, page: u32) -> Result<()> {
        self.navigator.navigate_to(page)
    }

    /// Drop everything learned after the token check
    pub fn reset_verification(&mut self) {
        self.signer_email = None;
        self.signer = None;
        self.document = None;
        self.navigator = PageNavigator::default();
        self.fields.clear();
        self.fields_changed();
    }

    pub(crate) fn fields_changed(&mut self) {
        self.pages = PageGroupIndex::build(&self.fields);
        self.version += 1;
    }
}
