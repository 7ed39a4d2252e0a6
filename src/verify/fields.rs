//! Search-constrained field verification.
//!
//! The primary anti-hallucination control: a generative proposer's claim is
//! accepted only when it is literally present (whitespace-normalized) in
//! the ground-truth page text. On success the proposal is replaced by the
//! verbatim source slice; on failure the proposal is kept, flagged
//! unverified, and an auditable warning is emitted. Fields are independent:
//! one failure never blocks the others.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::matcher;
use crate::domain::PageStore;

/// A proposed value for a search-constrained field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Field identifier used in audit output (e.g. "document_title")
    pub field: String,

    /// Proposed text, accepted only if verbatim-present in the source
    pub text: String,

    /// Page the proposer claims the text appears on
    pub page: u32,
}

impl SearchCandidate {
    pub fn new(field: impl Into<String>, text: impl Into<String>, page: u32) -> Self {
        Self {
            field: field.into(),
            text: text.into(),
            page,
        }
    }
}

/// Outcome of verifying one search-constrained field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub field: String,

    pub page: u32,

    /// Verbatim source text if verified, the original proposal otherwise
    pub value: String,

    pub verified: bool,

    /// Digest of the verbatim slice, for drift detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_sha256: Option<String>,
}

/// Truncate to at most `max` characters without splitting a char
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Verify a single candidate against the page store
pub fn verify(candidate: &SearchCandidate, pages: &PageStore) -> VerificationResult {
    match matcher::search(&candidate.text, candidate.page, pages) {
        Some(verbatim) => VerificationResult {
            field: candidate.field.clone(),
            page: candidate.page,
            value: verbatim.to_string(),
            verified: true,
            source_sha256: Some(matcher::slice_digest(verbatim)),
        },
        None => {
            warn!(
                field = %candidate.field,
                page = candidate.page,
                text = %truncate_chars(&candidate.text, 80),
                "search-constrained field not found in source"
            );
            VerificationResult {
                field: candidate.field.clone(),
                page: candidate.page,
                value: candidate.text.clone(),
                verified: false,
                source_sha256: None,
            }
        }
    }
}

/// Verify a batch of candidates independently
pub fn verify_all(candidates: &[SearchCandidate], pages: &PageStore) -> Vec<VerificationResult> {
    candidates.iter().map(|c| verify(c, pages)).collect()
}
