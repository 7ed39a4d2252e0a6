//! Cause-of-action candidates and their paragraph ranges.

use serde::{Deserialize, Serialize};

/// Inclusive paragraph span claimed for a cause of action.
///
/// `start == end == 0` is the "not applicable" sentinel, distinct from a
/// zero-length range: it is always reported unverified without any
/// comparison being attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRange {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub end: u32,
}

impl ParagraphRange {
    /// Whether the range carries real bounds to check
    pub fn is_applicable(&self) -> bool {
        self.start > 0 && self.end > 0
    }
}

/// A proposed cause of action. Title fidelity is checked by the field
/// verifier; this record's `verified` flag covers the paragraph span only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseOfAction {
    pub number: u32,

    /// Proposed title (a search-constrained field, verified separately)
    pub title: String,

    /// Page the title is claimed to appear on
    pub page: u32,

    #[serde(default)]
    pub paragraph_range: ParagraphRange,

    /// Whether every paragraph in the range was observed in the source
    #[serde(default)]
    pub verified: bool,

    /// Paragraph numbers in the range missing from the source, ascending
    #[serde(default)]
    pub missing_paragraphs: Vec<u32>,
}
