//! Classification-output loading.
//!
//! The classification collaborator emits one JSON result per document:
//! per-page footnote claims, caption fields, and causes of action. All of
//! it is hint material. Footnote claims become [`LocationRecord`]s,
//! trusted for identity and placement only and never for content, and the
//! search-constrained fields become candidates for the verifier.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::{CauseOfAction, LocationRecord, MergeStatus, ParagraphRange};
use crate::verify::SearchCandidate;

use super::StructureError;

/// Top-level classification result (manifest or raw classifier JSON;
/// both carry the same `pages` shape)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationResult {
    #[serde(default)]
    pub caption_info: CaptionInfo,

    #[serde(default)]
    pub causes_of_action: Vec<ProposedCause>,

    #[serde(default)]
    pub pages: Vec<ClassifiedPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptionInfo {
    #[serde(default)]
    pub document_title: Option<ProposedField>,
}

/// A search-constrained field proposal: the text is an input to the
/// matcher, not an accepted value
#[derive(Debug, Clone, Deserialize)]
pub struct ProposedField {
    #[serde(default)]
    pub search_text: String,

    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposedCause {
    #[serde(default)]
    pub number: u32,

    #[serde(default)]
    pub search_text: String,

    #[serde(default)]
    pub page: u32,

    #[serde(default)]
    pub paragraph_range: ParagraphRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifiedPage {
    #[serde(default)]
    pub page_number: u32,

    #[serde(default)]
    pub footnotes: Vec<ClassifiedFootnote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifiedFootnote {
    #[serde(default)]
    pub fn_number: u32,

    #[serde(default)]
    pub merge_status: MergeStatus,

    #[serde(default)]
    pub merge_location: String,

    #[serde(default)]
    pub fn_text: String,
}

impl ClassificationResult {
    pub fn parse(json: &str) -> Result<Self, StructureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, StructureError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Footnote location inventory, in page order.
    ///
    /// Claims with a zero footnote number are dropped. Repeated claims for
    /// the same number are kept so the reconciler can report them as
    /// duplicates rather than silently collapsing them.
    pub fn footnote_inventory(&self) -> Vec<LocationRecord> {
        let mut records = Vec::new();
        for page in &self.pages {
            for footnote in &page.footnotes {
                if footnote.fn_number == 0 {
                    continue;
                }
                records.push(LocationRecord {
                    number: footnote.fn_number,
                    page: page.page_number,
                    status: footnote.merge_status,
                    location_hint: footnote.merge_location.clone(),
                    proposed_text: footnote.fn_text.clone(),
                });
            }
        }
        records
    }

    /// Search-constrained field candidates: the caption title plus each
    /// cause-of-action title
    pub fn field_candidates(&self) -> Vec<SearchCandidate> {
        let mut candidates = Vec::new();
        if let Some(title) = &self.caption_info.document_title {
            if !title.search_text.is_empty() {
                candidates.push(SearchCandidate::new(
                    "document_title",
                    title.search_text.clone(),
                    title.page,
                ));
            }
        }
        for coa in &self.causes_of_action {
            candidates.push(SearchCandidate::new(
                format!("coa_{}_title", coa.number),
                coa.search_text.clone(),
                coa.page,
            ));
        }
        candidates
    }

    /// Cause-of-action candidates for paragraph-range validation
    pub fn cause_candidates(&self) -> Vec<CauseOfAction> {
        self.causes_of_action
            .iter()
            .map(|coa| CauseOfAction {
                number: coa.number,
                title: coa.search_text.clone(),
                page: coa.page,
                paragraph_range: coa.paragraph_range,
                verified: false,
                missing_paragraphs: Vec::new(),
            })
            .collect()
    }
}

/// Locate the classification output that belongs to a combined document:
/// `<stem>_classification/manifest.json`, falling back to the raw
/// classifier JSON. Absence is not an error: the merge falls back to
/// scan-only mode.
pub fn discover_classification(input: &Path) -> Result<Option<ClassificationResult>, StructureError> {
    let stem = match input.file_stem().and_then(|s| s.to_str()) {
        Some(stem) => stem,
        None => return Ok(None),
    };
    let dir = input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{stem}_classification"));

    let manifest = dir.join("manifest.json");
    if manifest.is_file() {
        debug!(path = %manifest.display(), "loading classification manifest");
        return ClassificationResult::from_file(&manifest).map(Some);
    }

    if let Some(raw) = find_raw_classification(&dir) {
        debug!(path = %raw.display(), "loading raw classification output");
        return ClassificationResult::from_file(&raw).map(Some);
    }

    Ok(None)
}

fn find_raw_classification(dir: &Path) -> Option<PathBuf> {
    let pattern = dir.join("*_text_classification_raw.json");
    let mut matches: Vec<PathBuf> = glob::glob(pattern.to_str()?)
        .ok()?
        .filter_map(Result::ok)
        .collect();
    matches.sort();
    matches.into_iter().next()
}
