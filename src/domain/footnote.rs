//! Footnote records on both sides of the authority split.
//!
//! [`LocationRecord`] is what the classification collaborator claims about a
//! footnote: which number exists and which page it belongs to. It is a hint
//! for identity and placement only; its text field is kept for diagnostics
//! and never merged into the document. The content authority is the text
//! extraction scan in `reconcile::scan`.

use serde::{Deserialize, Serialize};

/// Merge status claimed by the location collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    Merged,
    Missing,
    Partial,
    #[default]
    #[serde(other)]
    NotApplicable,
}

/// Externally supplied footnote placement claim. Untrusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Footnote number
    pub number: u32,

    /// Page the collaborator claims the footnote belongs to
    pub page: u32,

    /// Collaborator's own merge assessment
    #[serde(default)]
    pub status: MergeStatus,

    /// Free-text placement hint from the collaborator
    #[serde(default)]
    pub location_hint: String,

    /// Collaborator's version of the footnote text. Diagnostic only:
    /// displayed text always comes from the source scan.
    #[serde(default)]
    pub proposed_text: String,
}

/// A footnote after reconciliation: number, final page assignment, and the
/// scanned content (if any was found)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledFootnote {
    pub number: u32,

    /// Final page, after attribution correction
    pub page: u32,

    /// Extracted content. `None` means the footnote was placed but no text
    /// block was found anywhere: recorded, never fabricated.
    pub text: Option<String>,

    /// Whether the claimed page was overridden by the marker survey
    pub correction_applied: bool,

    /// The original claimed page, kept when a correction was applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_page: Option<u32>,
}

/// Which inventory drove the merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySource {
    /// Location hints supplied the inventory, the scan supplied the text
    HintsAndScan,
    /// No hints: both inventory and text came from the scan
    ScanOnly,
}

/// Per-page merge diagnostics. All lists are sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReport {
    pub page: u32,

    /// Footnote numbers placed on this page
    pub found: Vec<u32>,

    /// Placed numbers with both an inline reference and text
    pub merged: Vec<u32>,

    /// Placed numbers with text but no inline reference anywhere
    pub unmatched: Vec<u32>,

    /// Placed numbers with a reference or claim but no text found
    pub no_text: Vec<u32>,
}

/// Aggregate merge diagnostics for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeStats {
    pub source: InventorySource,

    pub pages_with_footnotes: usize,

    /// Total placements across pages
    pub found: usize,

    /// Placements substituted inline
    pub merged: usize,

    /// Placements with text but no inline reference
    pub unmatched: usize,

    /// Placements with no extracted text
    pub no_text: usize,

    /// Integers skipped in the resolved numbering, ascending
    pub gaps: Vec<u32>,

    /// Numbers resolved more than once, ascending, each reported once
    pub duplicates: Vec<u32>,

    /// Per-page detail, pages ascending
    pub pages: Vec<PageReport>,
}
