//! Input materialization for the engine.
//!
//! Everything the core consumes is fully loaded here before any pass
//! begins:
//!
//! 1. **Combined document**: the OCR pipeline's page-delimited text file,
//!    parsed into framed page blocks
//! 2. **Hints**: the optional classification output carrying the footnote
//!    location inventory and search-constrained field proposals
//!
//! Malformed input structure is the one fatal error class. It aborts the
//! current document only. Everything downstream degrades to diagnostics.

pub mod combined;
pub mod hints;

use thiserror::Error;

// Re-export key types
pub use combined::{CombinedDocument, PageBlock};
pub use hints::{ClassificationResult, ProposedCause, ProposedField};

/// Structural input errors. Fatal for the affected document; a
/// multi-document caller logs and continues.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("page {page} is missing its end delimiter")]
    UnclosedPage { page: u32 },

    #[error("end delimiter without a matching start at line {line}")]
    UnexpectedEnd { line: usize },

    #[error("page delimiter mismatch: start says {start}, end says {end}")]
    DelimiterMismatch { start: u32, end: u32 },

    #[error("page numbers must be strictly increasing: {prev} then {next}")]
    PageOrder { prev: u32, next: u32 },

    #[error("invalid page number {raw:?}")]
    InvalidPageNumber { raw: String },

    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed hints JSON: {0}")]
    MalformedHints(#[from] serde_json::Error),
}
