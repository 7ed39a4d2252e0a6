//! Document scans that establish the reconciler's ground truth.
//!
//! Two independent read-only stores come out of these passes:
//!
//! - the **marker survey**: which pages actually cite each footnote
//!   number, derived from inline reference markers in the body text
//! - the **text extraction**: what each footnote says, derived from the
//!   trailing text blocks
//!
//! Neither store trusts the external location hints; the merge consumes
//! both and corrects the hints against them.

use std::collections::{BTreeMap, BTreeSet};

use regex::Captures;

use crate::config::{DuplicateTextPolicy, Markers};
use crate::ingest::{CombinedDocument, PageBlock};

/// number → pages where an inline reference marker cites it
pub type MarkerSurvey = BTreeMap<u32, BTreeSet<u32>>;

/// A footnote's extracted content and the page that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub page: u32,
    pub text: String,
}

/// number → content, after applying the duplicate policy
pub type TextMap = BTreeMap<u32, ExtractedText>;

pub(crate) fn footnote_number(caps: &Captures) -> Option<u32> {
    caps.get(1)?.as_str().parse().ok()
}

/// Scan every page for inline reference markers.
///
/// This is self-derived ground truth about actual citation sites,
/// independent of any external hint. A line that matches the text-block
/// token is the footnote's own content, not a citation site, and is
/// excluded from the survey.
pub fn survey_markers(doc: &CombinedDocument, markers: &Markers) -> MarkerSurvey {
    let mut survey = MarkerSurvey::new();
    for block in &doc.blocks {
        for line in &block.lines {
            if markers.block.is_match(line) {
                continue;
            }
            for caps in markers.inline.captures_iter(line) {
                if let Some(number) = footnote_number(&caps) {
                    survey.entry(number).or_default().insert(block.number);
                }
            }
        }
    }
    survey
}

/// Scan every page for trailing text blocks, pages in ascending order.
///
/// Content is trimmed; a block that trims to nothing counts as no text.
/// When the same number's block appears on more than one page the
/// configured duplicate policy decides which page's content survives.
pub fn extract_texts(doc: &CombinedDocument, markers: &Markers) -> TextMap {
    let mut map = TextMap::new();
    for block in &doc.blocks {
        for (number, text) in blocks_in_page(block, markers) {
            let entry = ExtractedText {
                page: block.number,
                text,
            };
            match markers.duplicate_text {
                DuplicateTextPolicy::LastWins => {
                    map.insert(number, entry);
                }
                DuplicateTextPolicy::FirstWins => {
                    map.entry(number).or_insert(entry);
                }
            }
        }
    }
    map
}

/// Text blocks found on one page, with trimmed content, skipping blocks
/// whose content trims to nothing
fn blocks_in_page(block: &PageBlock, markers: &Markers) -> Vec<(u32, String)> {
    let mut found = Vec::new();
    for line in &block.lines {
        if let Some(caps) = markers.block.captures(line) {
            if let Some(number) = footnote_number(&caps) {
                let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
                if !text.is_empty() {
                    found.push((number, text.to_string()));
                }
            }
        }
    }
    found
}

/// Footnote numbers whose text block sits on this page
pub fn block_numbers_on_page(block: &PageBlock, markers: &Markers) -> BTreeSet<u32> {
    blocks_in_page(block, markers)
        .into_iter()
        .map(|(number, _)| number)
        .collect()
}
