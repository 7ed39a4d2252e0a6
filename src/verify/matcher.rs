//! Whitespace-insensitive exact matching with verbatim reverse mapping.
//!
//! # Design Decisions
//!
//! - **Exact match only**: no fuzzy matching of any kind. A candidate either
//!   appears in the source (ignoring whitespace) or it does not.
//! - **Honest failure**: a candidate that cannot be located is reported as
//!   not found, never approximated. Failure is a value, not an error.
//! - **Verbatim mapping**: the slice handed back to callers is the original
//!   source text with its punctuation, casing, and line breaks intact,
//!   never the normalized form.
//! - **Page-scoped**: a search never crosses page boundaries; a page lookup
//!   miss is "not found".

use sha2::{Digest, Sha256};

use crate::domain::PageStore;

/// Whitespace characters collapsed by [`normalize`]
fn is_collapsible(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Idempotent: `normalize(normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_gap = false;
    for c in s.chars() {
        if is_collapsible(c) {
            pending_gap = true;
        } else {
            if pending_gap && !out.is_empty() {
                out.push(' ');
            }
            pending_gap = false;
            out.push(c);
        }
    }
    out
}

/// Location of a match in normalized space, counted in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedSpan {
    /// Character offset of the match in the normalized haystack
    pub start: usize,
    /// Match length in characters
    pub len: usize,
}

/// Exact, case-sensitive search of `normalize(needle)` inside
/// `normalize(haystack)`. First occurrence only.
///
/// Returns `None` for empty or whitespace-only needles.
pub fn locate(needle: &str, haystack: &str) -> Option<NormalizedSpan> {
    let needle_norm = normalize(needle);
    if needle_norm.is_empty() {
        return None;
    }
    let hay_norm = normalize(haystack);
    let byte_idx = hay_norm.find(&needle_norm)?;
    Some(NormalizedSpan {
        start: hay_norm[..byte_idx].chars().count(),
        len: needle_norm.chars().count(),
    })
}

/// Map a normalized-space span back to the verbatim original slice.
///
/// Walks the original and its normalized form in lockstep: one normalized
/// step corresponds to either one non-whitespace original character or one
/// whole original whitespace run (collapsed to the single normalized
/// space). Returns `None` if the span does not fit inside the haystack.
pub fn map_to_original(haystack: &str, span: NormalizedSpan) -> Option<&str> {
    let mut walk = haystack.char_indices().peekable();

    // Leading whitespace has no normalized counterpart
    while matches!(walk.peek(), Some((_, c)) if is_collapsible(*c)) {
        walk.next();
    }

    let mut pos = 0;
    while pos < span.start {
        let (_, c) = walk.next()?;
        if is_collapsible(c) {
            while matches!(walk.peek(), Some((_, next)) if is_collapsible(*next)) {
                walk.next();
            }
        }
        pos += 1;
    }

    let match_start = walk.peek().map(|(i, _)| *i)?;
    let mut match_end = match_start;
    let mut consumed = 0;
    while consumed < span.len {
        let (_, c) = walk.next()?;
        if is_collapsible(c) {
            while matches!(walk.peek(), Some((_, next)) if is_collapsible(*next)) {
                walk.next();
            }
        }
        consumed += 1;
        match_end = walk.peek().map(|(i, _)| *i).unwrap_or(haystack.len());
    }

    Some(&haystack[match_start..match_end])
}

/// Search one page for the candidate text, returning the verbatim source
/// slice at the match location.
///
/// Empty and whitespace-only candidates always return `None`, as does a
/// page lookup miss. Callers must branch on the outcome, never assume
/// success.
pub fn search<'a>(candidate: &str, page_number: u32, pages: &'a PageStore) -> Option<&'a str> {
    let page = pages.get(page_number)?;
    let span = locate(candidate, &page.text)?;
    map_to_original(&page.text, span)
}

/// SHA256 digest of a verbatim slice, hex with prefix, for drift detection
pub fn slice_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Page;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize("hello   world"), "hello world");
        assert_eq!(normalize("hello\t\n  world"), "hello world");
        assert_eq!(normalize("  padded  \r\n"), "padded");
        assert_eq!(normalize("\n\t \r"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["", "a", "  a  b\n c ", "x\t\ty", "¶ 12.  Alleges"] {
            assert_eq!(normalize(&normalize(s)), normalize(s));
        }
    }

    #[test]
    fn test_locate_across_line_break() {
        let span = locate("hello   world", "hello\nworld").unwrap();
        assert_eq!(span, NormalizedSpan { start: 0, len: 11 });
    }

    #[test]
    fn test_map_back_preserves_original_formatting() {
        let haystack = "hello\nworld";
        let span = locate("hello   world", haystack).unwrap();
        assert_eq!(map_to_original(haystack, span), Some("hello\nworld"));
    }

    #[test]
    fn test_map_back_round_trips_substrings() {
        let text = "COMPLAINT FOR DAMAGES\n\n  1. Plaintiff alleges,\nupon information\tand belief:";
        for needle in [
            "COMPLAINT FOR DAMAGES",
            "1. Plaintiff alleges,\nupon information",
            "upon information\tand belief:",
        ] {
            let span = locate(needle, text).unwrap();
            assert_eq!(map_to_original(text, span), Some(needle));
        }
    }

    #[test]
    fn test_locate_is_case_sensitive() {
        assert!(locate("Hello", "hello there").is_none());
    }

    #[test]
    fn test_locate_first_occurrence() {
        let span = locate("foo", "x foo y foo").unwrap();
        assert_eq!(span.start, 2);
    }

    #[test]
    fn test_map_back_multibyte() {
        let haystack = "see   ¶ 12.  “Grounds” for relief";
        let span = locate("¶ 12. “Grounds”", haystack).unwrap();
        assert_eq!(map_to_original(haystack, span), Some("¶ 12.  “Grounds”"));
    }

    #[test]
    fn test_search_is_page_scoped() {
        let store = PageStore::new(vec![
            Page::new(2, "the quick brown fox"),
            Page::new(3, "jumps over the lazy dog"),
        ])
        .unwrap();

        assert_eq!(search("quick brown", 2, &store), Some("quick brown"));
        // Present on page 2 but searched against page 3: not found
        assert!(search("quick brown", 3, &store).is_none());
        // Page lookup miss is not found, not an error
        assert!(search("quick brown", 9, &store).is_none());
    }

    #[test]
    fn test_search_rejects_blank_candidates() {
        let store = PageStore::new(vec![Page::new(1, "some text")]).unwrap();
        assert!(search("", 1, &store).is_none());
        assert!(search("  \n\t ", 1, &store).is_none());
    }

    #[test]
    fn test_slice_digest_format() {
        let digest = slice_digest("hello");
        assert!(digest.starts_with("sha256:"));
        assert_eq!(digest.len(), 7 + 64);
    }
}
