//! Paragraph-number indexing and cause-of-action range validation.
//!
//! Pleading paragraphs are numbered at the start of a line, optionally
//! prefixed with a pilcrow. The index pools every number observed across
//! the document; a cause of action's claimed paragraph span is plausible
//! only if each integer in the inclusive range was actually seen.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{CauseOfAction, PageStore};

/// Line-leading paragraph token: optional pilcrow, digits, a period, then
/// whitespace
static PARAGRAPH_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:¶\s*)?(\d+)\.\s").expect("paragraph pattern"));

/// Paragraph numbers observed in the document, per page and pooled
#[derive(Debug, Clone, Default)]
pub struct ParagraphIndex {
    per_page: BTreeMap<u32, BTreeSet<u32>>,
    pooled: BTreeSet<u32>,
}

impl ParagraphIndex {
    /// Scan every page for paragraph-number tokens
    pub fn build(pages: &PageStore) -> Self {
        let mut index = Self::default();
        for page in pages.iter() {
            let mut numbers = BTreeSet::new();
            for cap in PARAGRAPH_NUM_RE.captures_iter(&page.text) {
                if let Ok(n) = cap[1].parse::<u32>() {
                    numbers.insert(n);
                }
            }
            if !numbers.is_empty() {
                index.pooled.extend(numbers.iter().copied());
                index.per_page.insert(page.number, numbers);
            }
        }
        index
    }

    /// Numbers observed on one page
    pub fn on_page(&self, page: u32) -> Option<&BTreeSet<u32>> {
        self.per_page.get(&page)
    }

    /// Numbers observed anywhere in the document
    pub fn pooled(&self) -> &BTreeSet<u32> {
        &self.pooled
    }

    /// Range-validate one cause of action.
    ///
    /// Both bounds positive: the full inclusive range is checked against
    /// the pooled set; verified means no integer is missing. Any
    /// non-positive bound is the "not applicable" sentinel: reported
    /// unverified with no comparison attempted.
    pub fn verify_range(&self, coa: &CauseOfAction) -> CauseOfAction {
        let mut out = coa.clone();
        if coa.paragraph_range.is_applicable() {
            let missing: Vec<u32> = (coa.paragraph_range.start..=coa.paragraph_range.end)
                .filter(|n| !self.pooled.contains(n))
                .collect();
            out.verified = missing.is_empty();
            out.missing_paragraphs = missing;
        } else {
            out.verified = false;
            out.missing_paragraphs = Vec::new();
        }
        out
    }

    /// Range-validate a batch of candidates independently
    pub fn verify_causes(&self, causes: &[CauseOfAction]) -> Vec<CauseOfAction> {
        causes.iter().map(|c| self.verify_range(c)).collect()
    }
}
