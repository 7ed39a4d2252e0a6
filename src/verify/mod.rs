//! Source-grounding verification for proposer-supplied metadata.
//!
//! Nothing in this module trusts the proposer. A search-constrained field
//! is accepted only when the matcher finds it verbatim (whitespace
//! normalized) in the page it was claimed for; a cause-of-action paragraph
//! span is accepted only when every paragraph in it was observed in the
//! source. Failed checks keep the proposal, flagged, so reviewers can see
//! exactly what was claimed.

pub mod fields;
pub mod matcher;
pub mod paragraphs;

pub use fields::{verify, verify_all, SearchCandidate, VerificationResult};
pub use matcher::{locate, map_to_original, normalize, search, slice_digest, NormalizedSpan};
pub use paragraphs::ParagraphIndex;
