//! Page grouping and page navigation
//!
//! The grouping index is derived data: it is rebuilt from scratch by the
//! field store after every change to the field list and never patched.

use std::collections::BTreeMap;

use crate::error::{Result, SigningError};
use crate::model::SignatureField;

/// Page number to the store indices of the fields placed on that page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageGroupIndex {
    groups: BTreeMap<u32, Vec<usize>>,
}

impl PageGroupIndex {
    /// Group `fields` by page, keeping store order within each page
    pub fn build(fields: &[SignatureField]) -> Self {
        let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, field) in fields.iter().enumerate() {
            groups.entry(field.page_number()).or_default().push(index);
        }
        Self { groups }
    }

    /// Store indices of the fields on `page`, empty if none
    pub fn fields_on(&self, page: u32) -> &[usize] {
        self.groups.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pages that carry at least one field, ascending
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[usize])> + '_ {
        self.groups.iter().map(|(page, indices)| (*page, indices.as_slice()))
    }

    pub fn page_count(&self) -> usize {
        self.groups.len()
    }

    pub fn field_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Tracks the page currently shown by the document viewer
///
/// No bounds check against the document's page count: the viewer owns that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageNavigator {
    current: u32,
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self { current: 1 }
    }
}

impl PageNavigator {
    pub fn current_page(&self) -> u32 {
        self.current
    }

    pub fn navigate_to(&mut self, page: u32) -> Result<()> {
        if page == 0 {
            return Err(SigningError::InvalidPage(page));
        }
        self.current = page;
        Ok(())
    }
}
