//! Field content editing
//!
//! Edits replace a single field's content in place. Placement is never
//! touched and fields are never removed, so a cleared field stays
//! addressable by the same index for re-signing.

use tracing::debug;

use crate::error::{Result, SigningError};
use crate::model::FieldContent;
use crate::store::FieldStore;

impl FieldStore {
    /// Replace the content of field `index`
    pub fn set_content(&mut self, index: usize, content: FieldContent) -> Result<()> {
        let len = self.fields.len();
        let field = self
            .fields
            .get_mut(index)
            .ok_or(SigningError::InvalidFieldIndex { index, len })?;

        if field.kind() != content.kind() {
            return Err(SigningError::ContentKindMismatch {
                index,
                expected: field.kind(),
            });
        }

        debug!("Setting {} content on field {}", field.kind(), index);
        field.replace_content(Some(content));
        self.fields_changed();
        Ok(())
    }

    /// Remove the content of field `index`, keeping the field itself
    pub fn clear_content(&mut self, index: usize) -> Result<()> {
        let len = self.fields.len();
        let field = self
            .fields
            .get_mut(index)
            .ok_or(SigningError::InvalidFieldIndex { index, len })?;

        debug!("Clearing content on field {}", index);
        field.replace_content(None);
        self.fields_changed();
        Ok(())
    }
}
