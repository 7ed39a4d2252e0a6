//! Page records and the ordered page store.

use serde::{Deserialize, Serialize};

use crate::ingest::StructureError;

/// A single OCR'd page of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number, unique within the document
    pub number: u32,

    /// Raw page text exactly as extracted
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// Ordered, immutable collection of pages.
///
/// Page numbers are 1-based and strictly increasing. A lookup miss is a
/// normal outcome for the matcher ("not found"), never an error.
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    pages: Vec<Page>,
}

impl PageStore {
    /// Build a store, enforcing the ordering invariant
    pub fn new(pages: Vec<Page>) -> Result<Self, StructureError> {
        if let Some(first) = pages.first() {
            if first.number == 0 {
                return Err(StructureError::InvalidPageNumber {
                    raw: "0".to_string(),
                });
            }
        }
        for pair in pages.windows(2) {
            if pair[1].number <= pair[0].number {
                return Err(StructureError::PageOrder {
                    prev: pair[0].number,
                    next: pair[1].number,
                });
            }
        }
        Ok(Self { pages })
    }

    /// Look up a page by its 1-based number
    pub fn get(&self, number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Iterate pages in ascending number order
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
