//! Read-only view of the session for the signer's side panel

use serde::Serialize;

use crate::store::FieldStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SigningSummary {
    pub signer_name: Option<String>,
    pub signer_email: Option<String>,
    pub document_name: Option<String>,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub page_number: u32,
    pub is_current: bool,
    pub fields: Vec<FieldStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStatus {
    /// 1-based position within the page's list
    pub ordinal: usize,
    /// Index into the store, for edits
    pub index: usize,
    pub completed: bool,
    pub x: i64,
    pub y: i64,
}

impl SigningSummary {
    pub fn from_store(store: &FieldStore) -> Self {
        let current = store.current_page();
        let pages = store
            .pages()
            .iter()
            .map(|(page_number, indices)| PageSummary {
                page_number,
                is_current: page_number == current,
                fields: indices
                    .iter()
                    .enumerate()
                    .map(|(i, &index)| {
                        let field = &store.fields()[index];
                        let position = field.position();
                        FieldStatus {
                            ordinal: i + 1,
                            index,
                            completed: field.is_completed(),
                            x: position.x.round() as i64,
                            y: position.y.round() as i64,
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            signer_name: store.signer_name().map(str::to_string),
            signer_email: store.signer_email().map(str::to_string),
            document_name: store.document_name().map(str::to_string),
            total_fields: store.fields().len(),
            completed_fields: store.completed_count(),
            pages,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total_fields > 0 && self.completed_fields == self.total_fields
    }
}
